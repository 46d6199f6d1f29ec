use std::cmp::Ordering;

use crate::config::SurveyOrder;

// A label is split into runs of digits and runs of everything else.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut res: Vec<Chunk<'_>> = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;
    for (idx, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(d) if d != is_digit => {
                res.push(make_chunk(&s[start..idx], d));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(d) = in_digits {
        res.push(make_chunk(&s[start..], d));
    }
    res
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a2 = a.trim_start_matches('0');
    let b2 = b.trim_start_matches('0');
    // Same number of significant digits: the lexical order is the numeric order.
    a2.len().cmp(&b2.len()).then_with(|| a2.cmp(b2))
}

/// Numeric-aware comparison of two labels.
///
/// Runs of digits are compared by value, so that `NFHS-9` comes before `NFHS-10`.
/// Labels that compare equal this way (`NFHS-04` and `NFHS-4`) fall back to the
/// plain string order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);
    for (x, y) in ca.iter().zip(cb.iter()) {
        let o = match (x, y) {
            (Chunk::Digits(l), Chunk::Digits(r)) => cmp_digits(l, r),
            (Chunk::Text(l), Chunk::Text(r)) => l.cmp(r),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if o != Ordering::Equal {
            return o;
        }
    }
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

impl SurveyOrder {
    /// Compares two survey labels under this ordering.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SurveyOrder::Natural => natural_cmp(a, b),
            SurveyOrder::Explicit(rounds) => {
                let pa = rounds.iter().position(|r| r == a);
                let pb = rounds.iter().position(|r| r == b);
                match (pa, pb) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => natural_cmp(a, b),
                }
            }
        }
    }

    pub fn from_labels(labels: &[String]) -> SurveyOrder {
        if labels.is_empty() {
            SurveyOrder::Natural
        } else {
            SurveyOrder::Explicit(labels.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(order: &SurveyOrder, xs: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = xs.iter().map(|s| s.to_string()).collect();
        v.sort_by(|a, b| order.compare(a, b));
        v
    }

    #[test]
    fn natural_order_of_survey_rounds() {
        assert_eq!(
            sorted(&SurveyOrder::Natural, &["NFHS-5", "NFHS-10", "NFHS-3", "NFHS-4"]),
            vec!["NFHS-3", "NFHS-4", "NFHS-5", "NFHS-10"]
        );
    }

    #[test]
    fn natural_order_with_years() {
        assert_eq!(
            sorted(
                &SurveyOrder::Natural,
                &["NFHS-4 (2015-16)", "NFHS-3 (2005-06)", "NFHS-5 (2019-21)"]
            ),
            vec!["NFHS-3 (2005-06)", "NFHS-4 (2015-16)", "NFHS-5 (2019-21)"]
        );
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(natural_cmp("Round02", "Round10"), Ordering::Less);
        assert_eq!(natural_cmp("Round2", "Round02"), Ordering::Greater);
        assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
    }

    #[test]
    fn explicit_order_wins() {
        let order = SurveyOrder::Explicit(vec!["Late".to_string(), "Early".to_string()]);
        assert_eq!(
            sorted(&order, &["Early", "Other2", "Late", "Other1"]),
            vec!["Late", "Early", "Other1", "Other2"]
        );
    }

    #[test]
    fn empty_list_is_natural() {
        assert_eq!(SurveyOrder::from_labels(&[]), SurveyOrder::Natural);
    }
}
