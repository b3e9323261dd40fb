//! # Eligibility Classifier
//! Pure keep/drop logic for one candidate. No I/O.
//!
//! Two tracks, checked in order:
//! - **Authority**: venue is on the allowlist, or the venue score meets the
//!   minimum. Qualifying here ends evaluation.
//! - **Velocity**: primary metric meets the minimum *and* at least one
//!   taxonomy rule matches. Metric alone is not enough.
//!
//! Anything else is dropped and never tagged, counted or ranked.

use serde::{Deserialize, Serialize};

use crate::ingest::is_allowlisted;
use crate::ingest::types::Candidate;
use crate::taxonomy::{Taxonomy, FALLBACK_AUTHORITY_TAG};

const UNKNOWN_VENUE: &str = "Unknown Venue";

/// Why a candidate was kept. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Authority,
    Velocity,
}

impl SignalType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Authority => "AUTHORITY",
            Self::Velocity => "VELOCITY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierCfg {
    pub allowlist: Vec<String>,
    pub min_secondary_score: f64,
    pub min_velocity_metric: u64,
    /// "citations" | "stars"
    pub metric_label: &'static str,
}

impl Default for ClassifierCfg {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            min_secondary_score: 30.0,
            min_velocity_metric: 1,
            metric_label: "citations",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kept: bool,
    pub signal_type: Option<SignalType>,
    pub reason: String,
    pub tags: Vec<String>,
}

impl Classification {
    fn kept(signal_type: SignalType, reason: String, tags: Vec<String>) -> Self {
        Self {
            kept: true,
            signal_type: Some(signal_type),
            reason,
            tags,
        }
    }

    fn dropped(reason: impl Into<String>) -> Self {
        Self {
            kept: false,
            signal_type: None,
            reason: reason.into(),
            tags: Vec::new(),
        }
    }
}

pub(crate) fn venue_label(c: &Candidate) -> &str {
    c.venue_name
        .as_deref()
        .or(c.venue_id.as_deref())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_VENUE)
}

/// Authority track. Returns the reason when it qualifies.
fn authority_reason(c: &Candidate, cfg: &ClassifierCfg) -> Option<String> {
    let on_allowlist = c
        .venue_id
        .as_deref()
        .is_some_and(|v| is_allowlisted(v, &cfg.allowlist))
        || c
            .venue_name
            .as_deref()
            .is_some_and(|v| is_allowlisted(v, &cfg.allowlist));
    let score = c.secondary_or_zero();

    if on_allowlist {
        if score > 0.0 {
            Some(format!("TRUSTED VENUE ({} IF:{:.1})", venue_label(c), score))
        } else {
            Some(format!("TRUSTED VENUE ({})", venue_label(c)))
        }
    } else if score > 0.0 && score >= cfg.min_secondary_score {
        Some(format!("TOP VENUE ({} IF:{:.1})", venue_label(c), score))
    } else {
        None
    }
}

pub fn classify(c: &Candidate, taxonomy: &Taxonomy, cfg: &ClassifierCfg) -> Classification {
    let text = c.text_blob();

    // Track A
    if let Some(reason) = authority_reason(c, cfg) {
        let mut tags = taxonomy.tag(&text);
        if tags.is_empty() {
            tags.push(FALLBACK_AUTHORITY_TAG.to_string());
        }
        return Classification::kept(SignalType::Authority, reason, tags);
    }

    // Track B. A zero metric is "no traction" whatever the floor says.
    if c.primary_metric == 0 || c.primary_metric < cfg.min_velocity_metric {
        return Classification::dropped(format!(
            "below velocity floor ({} < {} {})",
            c.primary_metric, cfg.min_velocity_metric, cfg.metric_label
        ));
    }
    let tags = taxonomy.tag(&text);
    if tags.is_empty() {
        return Classification::dropped("no taxonomy match");
    }
    Classification::kept(
        SignalType::Velocity,
        format!(
            "VELOCITY BREAKOUT ({} {})",
            c.primary_metric, cfg.metric_label
        ),
        tags,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ClassifierCfg {
        ClassifierCfg {
            allowlist: vec!["NatureX".into()],
            ..Default::default()
        }
    }

    fn cand(id: &str, title: &str, metric: u64, score: f64, venue: Option<&str>) -> Candidate {
        let mut c = Candidate::new(id, title);
        c.primary_metric = metric;
        c.secondary_score = Some(score);
        c.venue_id = venue.map(str::to_string);
        c
    }

    #[test]
    fn allowlisted_venue_is_authority_with_fallback_tag() {
        let t = Taxonomy::default();
        let c = cand("A", "Field notes on moss", 2, 35.0, Some("NatureX"));
        let r = classify(&c, &t, &cfg());
        assert!(r.kept);
        assert_eq!(r.signal_type, Some(SignalType::Authority));
        assert_eq!(r.tags, vec![FALLBACK_AUTHORITY_TAG]);
        assert!(r.reason.contains("NatureX"));
    }

    #[test]
    fn score_threshold_alone_qualifies_authority() {
        let t = Taxonomy::default();
        let mut c = cand("S", "Graphene at scale", 0, 30.0, Some("S999"));
        c.venue_name = Some("Big Journal".into());
        let r = classify(&c, &t, &cfg());
        assert_eq!(r.signal_type, Some(SignalType::Authority));
        assert_eq!(r.reason, "TOP VENUE (Big Journal IF:30.0)");
        assert_eq!(r.tags, vec!["ADVANCED_MATERIALS"]);
    }

    #[test]
    fn authority_wins_even_when_velocity_would_qualify() {
        let t = Taxonomy::default();
        let c = cand("AB", "A new transformer model", 500, 0.0, Some("naturex"));
        let r = classify(&c, &t, &cfg());
        assert_eq!(r.signal_type, Some(SignalType::Authority));
        assert_eq!(r.tags, vec!["AI_CORE"]);
    }

    #[test]
    fn velocity_with_tag_is_kept() {
        let t = Taxonomy::default();
        let c = cand("B", "a new transformer model", 5, 0.0, None);
        let r = classify(&c, &t, &cfg());
        assert!(r.kept);
        assert_eq!(r.signal_type, Some(SignalType::Velocity));
        assert!(r.tags.iter().any(|x| x == "AI_CORE"));
        assert_eq!(r.reason, "VELOCITY BREAKOUT (5 citations)");
    }

    #[test]
    fn velocity_without_tag_is_dropped() {
        let t = Taxonomy::default();
        let c = cand("C", "annual report of committee", 5000, 0.0, None);
        let r = classify(&c, &t, &cfg());
        assert!(!r.kept);
        assert!(r.signal_type.is_none());
        assert!(r.tags.is_empty());
    }

    #[test]
    fn missing_metric_and_score_never_qualify() {
        let t = Taxonomy::default();
        let mut c = Candidate::new("Z", "a new transformer model");
        c.secondary_score = None;
        let r = classify(&c, &t, &cfg());
        assert!(!r.kept);
    }

    #[test]
    fn zero_floor_still_needs_traction() {
        let t = Taxonomy::default();
        let open_floor = ClassifierCfg {
            min_velocity_metric: 0,
            ..cfg()
        };
        let c = Candidate::new("Z", "a new transformer model");
        let r = classify(&c, &t, &open_floor);
        assert!(!r.kept);
        assert!(r.reason.starts_with("below velocity floor"));

        let mut one = Candidate::new("O", "a new transformer model");
        one.primary_metric = 1;
        assert_eq!(
            classify(&one, &t, &open_floor).signal_type,
            Some(SignalType::Velocity)
        );
    }

    #[test]
    fn nan_score_is_treated_as_zero() {
        let t = Taxonomy::default();
        let c = cand("N", "annual report", 0, f64::NAN, None);
        let strict = ClassifierCfg {
            min_secondary_score: 0.0,
            ..cfg()
        };
        assert!(!classify(&c, &t, &strict).kept);
    }

    #[test]
    fn signal_type_orders_authority_first() {
        assert!(SignalType::Authority < SignalType::Velocity);
        assert_eq!(
            serde_json::to_value(SignalType::Velocity).unwrap(),
            serde_json::json!("VELOCITY")
        );
    }
}
