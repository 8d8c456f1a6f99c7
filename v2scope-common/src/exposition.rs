//! Parser for the Prometheus-style text exposition format.
//!
//! Each non-comment line is either `name value` or
//! `name{label="value",...} value`. V2Ray's traffic counters get a
//! dedicated parse path because their flattened keys are built from two
//! positional label values rather than the full label set.

use thiserror::Error;

/// Error type for single-line parse failures.
///
/// A parse failure only ever affects the line that produced it; callers
/// skip the line and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty metric line")]
    Empty,
    #[error("label set opened with '{{' but never closed")]
    UnterminatedLabels,
    #[error("invalid metric value '{0}'")]
    InvalidValue(String),
    #[error("traffic line has no label set")]
    MissingLabels,
    #[error("traffic label token has fewer than four quote-delimited parts")]
    MalformedTrafficLabels,
}

/// One parsed metric line: name, labels in declaration order, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name (text before the label set, or the first token).
    pub name: String,
    /// Labels in the order they appear on the line. Keys are unique
    /// within a sample.
    pub labels: Vec<(String, String)>,
    /// The measured value.
    pub value: f64,
}

impl Sample {
    /// Build the flattened snapshot key: the metric name alone when the
    /// sample has no labels, otherwise the name joined with every label
    /// value (not name) in declaration order.
    pub fn flattened_key(&self) -> String {
        if self.labels.is_empty() {
            return self.name.clone();
        }

        let mut key = self.name.clone();
        for (_, value) in &self.labels {
            key.push('_');
            key.push_str(value);
        }
        key
    }
}

/// A V2Ray traffic counter line, reduced to its two positional label
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSample {
    /// Metric name (text before the label set).
    pub name: String,
    /// Second quote-delimited part of the label token (e.g. "inbound").
    pub dimension: String,
    /// Fourth quote-delimited part of the label token (e.g. "api").
    pub target: String,
    /// The measured value.
    pub value: f64,
}

impl TrafficSample {
    /// Flattened snapshot key: `name_dimension_target`.
    pub fn flattened_key(&self) -> String {
        format!("{}_{}_{}", self.name, self.dimension, self.target)
    }
}

/// Parse one exposition-format line into a [`Sample`].
///
/// Plain lines (`name value`) never fail on a bad value token: the value
/// falls back to `0.0`, matching the upstream exporter's consumers.
/// Labeled lines (`name{k="v",...} value`) report a bad value token as
/// [`ParseError::InvalidValue`] so the caller can skip the line.
///
/// Comment (`#`) and blank lines are the caller's job to filter out.
pub fn parse_line(line: &str) -> Result<Sample, ParseError> {
    if line.contains('{') {
        parse_labeled_line(line)
    } else {
        parse_plain_line(line)
    }
}

fn parse_plain_line(line: &str) -> Result<Sample, ParseError> {
    let mut parts = line.split_whitespace();
    let name = parts.next().ok_or(ParseError::Empty)?;

    // The value is the last whitespace-delimited token; on a line with a
    // single token that token doubles as the (unparsable) value and the
    // fallback applies.
    let value = line
        .split_whitespace()
        .next_back()
        .and_then(|token| token.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(Sample {
        name: name.to_string(),
        labels: Vec::new(),
        value,
    })
}

fn parse_labeled_line(line: &str) -> Result<Sample, ParseError> {
    let open = line.find('{').ok_or(ParseError::Empty)?;
    let close = line.find('}').ok_or(ParseError::UnterminatedLabels)?;
    if close < open {
        return Err(ParseError::UnterminatedLabels);
    }

    let name = &line[..open];
    let raw_labels = &line[open + 1..close];

    let mut labels = Vec::new();
    for segment in raw_labels.split(',') {
        // A segment without '=' is dropped, not a line failure.
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        labels.push((key.to_string(), strip_quotes(value).to_string()));
    }

    let token = line
        .split_whitespace()
        .next_back()
        .ok_or(ParseError::Empty)?;
    let value = token
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidValue(token.to_string()))?;

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

/// Parse a traffic counter line (metric name contains "traffic").
///
/// The second-to-last whitespace token carries the label set; its 2nd and
/// 4th quote-delimited parts are the dimension and target. This indexing
/// is deliberately positional: it mirrors the label order the V2Ray
/// exporter emits and breaks if upstream reorders labels. Kept for
/// compatibility with the exporter, not as a general parsing strategy.
pub fn parse_traffic_line(line: &str) -> Result<TrafficSample, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(ParseError::Empty);
    }

    let token = parts[parts.len() - 1];
    let value = token
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidValue(token.to_string()))?;

    let label_token = parts[parts.len() - 2];
    let quoted: Vec<&str> = label_token.split('"').collect();
    if quoted.len() < 4 {
        return Err(ParseError::MalformedTrafficLabels);
    }

    let open = line.find('{').ok_or(ParseError::MissingLabels)?;

    Ok(TrafficSample {
        name: line[..open].to_string(),
        dimension: quoted[1].to_string(),
        target: quoted[3].to_string(),
        value,
    })
}

/// Strip exactly one pair of surrounding double quotes.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line() {
        let sample = parse_line("go_goroutines 42").unwrap();
        assert_eq!(sample.name, "go_goroutines");
        assert!(sample.labels.is_empty());
        assert_eq!(sample.value, 42.0);
        assert_eq!(sample.flattened_key(), "go_goroutines");
    }

    #[test]
    fn test_plain_line_scientific_notation() {
        let sample = parse_line("go_memstats_alloc_bytes 1.234e+07").unwrap();
        assert_eq!(sample.value, 1.234e7);
    }

    #[test]
    fn test_plain_line_bad_value_falls_back_to_zero() {
        let sample = parse_line("v2ray_up NaN-ish-garbage").unwrap();
        assert_eq!(sample.name, "v2ray_up");
        assert_eq!(sample.value, 0.0);
    }

    #[test]
    fn test_labeled_line_preserves_label_order() {
        let sample =
            parse_line("go_gc_duration_seconds{quantile=\"0.5\",le=\"1\",job=\"v2ray\"} 0.002")
                .unwrap();
        assert_eq!(sample.name, "go_gc_duration_seconds");
        assert_eq!(
            sample.labels,
            vec![
                ("quantile".to_string(), "0.5".to_string()),
                ("le".to_string(), "1".to_string()),
                ("job".to_string(), "v2ray".to_string()),
            ]
        );
        assert_eq!(sample.value, 0.002);
        assert_eq!(sample.flattened_key(), "go_gc_duration_seconds_0.5_1_v2ray");
    }

    #[test]
    fn test_labeled_segment_without_equals_is_dropped() {
        let sample = parse_line("m{a=\"1\",bogus,b=\"2\"} 7").unwrap();
        assert_eq!(sample.labels.len(), 2);
        assert_eq!(sample.flattened_key(), "m_1_2");
    }

    #[test]
    fn test_labeled_line_bad_value_is_an_error() {
        let err = parse_line("m{a=\"1\"} not-a-number").unwrap_err();
        assert_eq!(err, ParseError::InvalidValue("not-a-number".to_string()));
    }

    #[test]
    fn test_unterminated_label_set() {
        let err = parse_line("m{a=\"1\" 7").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedLabels);
    }

    #[test]
    fn test_traffic_line_real_exporter_shape() {
        let line = "v2ray_traffic_uplink_bytes_total{dimension=\"inbound\",target=\"api\"} 12345";
        let sample = parse_traffic_line(line).unwrap();
        assert_eq!(sample.dimension, "inbound");
        assert_eq!(sample.target, "api");
        assert_eq!(sample.value, 12345.0);
        assert_eq!(
            sample.flattened_key(),
            "v2ray_traffic_uplink_bytes_total_inbound_api"
        );
    }

    #[test]
    fn test_traffic_line_positional_indexing() {
        // Positions 1 and 3 of the quote-split token, regardless of the
        // label names involved.
        let line = "v2ray_traffic_uplink_bytes_total{inbound=\"api\",outbound=\"freedom\"} 12345";
        let sample = parse_traffic_line(line).unwrap();
        assert_eq!(sample.dimension, "api");
        assert_eq!(sample.target, "freedom");
        assert_eq!(
            sample.flattened_key(),
            "v2ray_traffic_uplink_bytes_total_api_freedom"
        );
    }

    #[test]
    fn test_traffic_line_too_few_quoted_parts() {
        let err = parse_traffic_line("v2ray_traffic_x{a=\"1\"} 5").unwrap_err();
        assert_eq!(err, ParseError::MalformedTrafficLabels);
    }

    #[test]
    fn test_traffic_line_bad_value() {
        let err =
            parse_traffic_line("v2ray_traffic_x{a=\"1\",b=\"2\"} oops").unwrap_err();
        assert_eq!(err, ParseError::InvalidValue("oops".to_string()));
    }

    #[test]
    fn test_parsing_is_pure() {
        let line = "v2ray_traffic_downlink_bytes_total{dimension=\"inbound\",target=\"api\"} 99";
        assert_eq!(
            parse_traffic_line(line).unwrap(),
            parse_traffic_line(line).unwrap()
        );
        assert_eq!(
            parse_line("go_threads 12").unwrap(),
            parse_line("go_threads 12").unwrap()
        );
    }
}
