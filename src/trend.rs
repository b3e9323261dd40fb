//! trend.rs — run-scoped accumulators for concept heat and per-tag counts.
//!
//! Both are plain owned values built by the pipeline for one run and then
//! consumed into the report. Heat only ever grows while folding.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;

use crate::ingest::types::Candidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendEntry {
    pub concept_name: String,
    pub heat_score: u64,
}

impl TrendEntry {
    /// Report form, e.g. `Large language model (Heat:17)`.
    pub fn display(&self) -> String {
        format!("{} (Heat:{})", self.concept_name, self.heat_score)
    }
}

#[derive(Debug, Clone)]
pub struct TrendAggregator {
    band: RangeInclusive<u8>,
    entries: Vec<TrendEntry>, // insertion order
    index: HashMap<String, usize>,
}

impl TrendAggregator {
    pub fn new(band: RangeInclusive<u8>) -> Self {
        Self {
            band,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add `primary_metric + 1` to every in-band concept of `c`.
    /// A concept listed twice on the same candidate counts once.
    pub fn fold(&mut self, c: &Candidate) {
        let weight = c.primary_metric.saturating_add(1);
        let mut seen: HashSet<&str> = HashSet::new();
        for concept in &c.concepts {
            let Some(level) = concept.level else {
                continue;
            };
            if !self.band.contains(&level) || !seen.insert(concept.name.as_str()) {
                continue;
            }
            match self.index.get(&concept.name) {
                Some(&i) => {
                    let e = &mut self.entries[i];
                    e.heat_score = e.heat_score.saturating_add(weight);
                }
                None => {
                    self.index.insert(concept.name.clone(), self.entries.len());
                    self.entries.push(TrendEntry {
                        concept_name: concept.name.clone(),
                        heat_score: weight,
                    });
                }
            }
        }
    }

    pub fn heat(&self, concept: &str) -> Option<u64> {
        self.index.get(concept).map(|&i| self.entries[i].heat_score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest heat first; equal heat keeps first-inserted first.
    pub fn top_k(&self, k: usize) -> Vec<TrendEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.heat_score.cmp(&a.heat_score));
        sorted.truncate(k);
        sorted
    }
}

/// Per-tag counts over the kept set, keyed in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    counts: BTreeMap<String, usize>,
}

impl TagCounts {
    pub fn add_all<'a, I: IntoIterator<Item = &'a String>>(&mut self, tags: I) {
        for t in tags {
            *self.counts.entry(t.clone()).or_insert(0) += 1;
        }
    }

    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn into_map(self) -> BTreeMap<String, usize> {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Concept;
    use rand::seq::SliceRandom;

    fn cand(id: &str, metric: u64, concepts: &[(&str, u8)]) -> Candidate {
        let mut c = Candidate::new(id, id);
        c.primary_metric = metric;
        c.concepts = concepts
            .iter()
            .map(|(n, l)| Concept::new(*n, Some(*l)))
            .collect();
        c
    }

    #[test]
    fn heat_is_metric_plus_one_summed() {
        let mut agg = TrendAggregator::new(2..=3);
        agg.fold(&cand("a", 4, &[("Qubit", 2)]));
        agg.fold(&cand("b", 0, &[("Qubit", 3)]));
        assert_eq!(agg.heat("Qubit"), Some(5 + 1));
    }

    #[test]
    fn out_of_band_and_levelless_concepts_are_ignored() {
        let mut agg = TrendAggregator::new(2..=3);
        let mut c = cand("a", 9, &[("Physics", 0), ("Very narrow", 5), ("Plasma", 2)]);
        c.concepts.push(Concept::new("Untiered", None));
        agg.fold(&c);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.heat("Physics"), None);
        assert_eq!(agg.heat("Untiered"), None);
        assert_eq!(agg.heat("Plasma"), Some(10));
    }

    #[test]
    fn totals_do_not_depend_on_fold_order() {
        let mut pool: Vec<Candidate> = (0..40u64)
            .map(|i| {
                let name = ["Alpha", "Beta", "Gamma"][(i % 3) as usize];
                cand(&format!("c{i}"), i * 7 % 13, &[(name, 2), ("Shared", 3)])
            })
            .collect();

        let mut forward = TrendAggregator::new(2..=3);
        pool.iter().for_each(|c| forward.fold(c));

        pool.shuffle(&mut rand::rng());
        let mut shuffled = TrendAggregator::new(2..=3);
        pool.iter().for_each(|c| shuffled.fold(c));

        let expected: u64 = pool.iter().map(|c| c.primary_metric + 1).sum();
        for name in ["Alpha", "Beta", "Gamma", "Shared"] {
            assert_eq!(forward.heat(name), shuffled.heat(name), "{name}");
        }
        assert_eq!(forward.heat("Shared"), Some(expected));
    }

    #[test]
    fn duplicate_concept_on_one_candidate_counts_once() {
        let mut agg = TrendAggregator::new(2..=3);
        agg.fold(&cand("a", 1, &[("Graphene", 2), ("Graphene", 3)]));
        assert_eq!(agg.heat("Graphene"), Some(2));
    }

    #[test]
    fn top_k_breaks_ties_by_first_insert() {
        let mut agg = TrendAggregator::new(2..=3);
        agg.fold(&cand("a", 2, &[("First", 2)]));
        agg.fold(&cand("b", 2, &[("Second", 2)]));
        agg.fold(&cand("c", 9, &[("Hot", 2)]));
        let top: Vec<String> = agg.top_k(2).iter().map(TrendEntry::display).collect();
        assert_eq!(top, vec!["Hot (Heat:10)", "First (Heat:3)"]);
    }

    #[test]
    fn tag_counts_accumulate() {
        let mut tc = TagCounts::default();
        tc.add_all(&vec!["AI_CORE".to_string(), "PARADIGM_SHIFT".to_string()]);
        tc.add_all(&vec!["AI_CORE".to_string()]);
        assert_eq!(tc.get("AI_CORE"), 2);
        assert_eq!(tc.get("BIO_REVOLUTION"), 0);
        assert_eq!(tc.into_map().len(), 2);
    }
}
