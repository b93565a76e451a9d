//! Main-product selection among a system's product streams.
//!
//! Primary candidates have "HP" in their id (any case) and more than
//! 0.1 kg/hr. When there are none, fallback candidates are streams whose id
//! does not contain "water" (any case) with more than 1 kg/hr. The largest
//! flow wins; on a tie the earliest stream is kept.

use br_sim::Stream;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const PRIMARY_MARKER: &str = "HP";
pub const PRIMARY_MIN_FLOW: f64 = 0.1;
pub const FALLBACK_EXCLUDED: &str = "water";
pub const FALLBACK_MIN_FLOW: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionBasis {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub stream: &'a Stream,
    pub basis: SelectionBasis,
}

/// Index of the selected `(id, kg/hr)` candidate and the rule that chose it.
pub fn select_index<'a, I>(candidates: I) -> Option<(usize, SelectionBasis)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let candidates: Vec<(&str, f64)> = candidates.into_iter().collect();

    let primary = largest(
        candidates
            .iter()
            .enumerate()
            .filter(|(_, (id, flow))| {
                id.to_uppercase().contains(PRIMARY_MARKER) && *flow > PRIMARY_MIN_FLOW
            })
            .map(|(index, (_, flow))| (index, *flow)),
    );
    if let Some(index) = primary {
        return Some((index, SelectionBasis::Primary));
    }

    largest(
        candidates
            .iter()
            .enumerate()
            .filter(|(_, (id, flow))| {
                !id.to_lowercase().contains(FALLBACK_EXCLUDED) && *flow > FALLBACK_MIN_FLOW
            })
            .map(|(index, (_, flow))| (index, *flow)),
    )
    .map(|index| (index, SelectionBasis::Fallback))
}

fn largest(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, flow) in candidates {
        if best.is_none_or(|(_, top)| flow > top) {
            best = Some((index, flow));
        }
    }
    best.map(|(index, _)| index)
}

pub fn select_main_product<'a, I>(products: I) -> AppResult<Selection<'a>>
where
    I: IntoIterator<Item = &'a Stream>,
{
    let products: Vec<&Stream> = products.into_iter().collect();
    let (index, basis) = select_index(products.iter().map(|s| (s.id(), s.f_mass())))
        .ok_or(AppError::NoProductFound {
            checked: products.len(),
        })?;
    Ok(Selection {
        stream: products[index],
        basis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use br_sim::Chemicals;

    #[test]
    fn largest_hp_stream_is_primary() {
        let picked = select_index([("HP-101", 5.0), ("HP-202", 12.0), ("Water-1", 9000.0)]);
        assert_eq!(picked, Some((1, SelectionBasis::Primary)));
    }

    #[test]
    fn fallback_skips_water_regardless_of_flow() {
        let picked = select_index([("HP-1", 0.05), ("Ethanol-1", 3.0), ("Water-1", 9000.0)]);
        assert_eq!(picked, Some((1, SelectionBasis::Fallback)));
    }

    #[test]
    fn lowercase_marker_counts_as_primary() {
        let picked = select_index([("vent", 50.0), ("hp_product", 0.2)]);
        assert_eq!(picked, Some((1, SelectionBasis::Primary)));
    }

    #[test]
    fn ties_keep_the_earliest() {
        let picked = select_index([("HP-a", 7.0), ("HP-b", 7.0)]);
        assert_eq!(picked, Some((0, SelectionBasis::Primary)));
    }

    #[test]
    fn exhaustion_is_none() {
        assert_eq!(select_index([("Water-1", 9000.0), ("vent", 0.5)]), None);
        assert_eq!(select_index(std::iter::empty::<(&str, f64)>()), None);
    }

    #[test]
    fn no_product_is_a_distinct_error() {
        let chemicals = Chemicals::new(["Water"]);
        let water = Stream::with_mass("wastewater", chemicals, &[("Water", 10.0)]).unwrap();
        let err = select_main_product([&water]).unwrap_err();
        assert!(matches!(err, AppError::NoProductFound { checked: 1 }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn stream_ids() -> impl Strategy<Value = Vec<(String, f64)>> {
        let id = prop::sample::select(vec![
            "HP_product", "hp-2", "Water-1", "wastewater", "Ethanol-1", "vent", "HPLC",
        ]);
        prop::collection::vec((id.prop_map(String::from), 0.0_f64..100.0), 0..8)
    }

    proptest! {
        #[test]
        fn selection_is_deterministic_and_maximal(candidates in stream_ids()) {
            let view = || candidates.iter().map(|(id, flow)| (id.as_str(), *flow));
            let first = select_index(view());
            prop_assert_eq!(first, select_index(view()));

            if let Some((index, basis)) = first {
                let qualifies = |(id, flow): (&str, f64)| match basis {
                    SelectionBasis::Primary => {
                        id.to_uppercase().contains(PRIMARY_MARKER) && flow > PRIMARY_MIN_FLOW
                    }
                    SelectionBasis::Fallback => {
                        !id.to_lowercase().contains(FALLBACK_EXCLUDED) && flow > FALLBACK_MIN_FLOW
                    }
                };
                let picked = candidates[index].1;
                prop_assert!(qualifies((candidates[index].0.as_str(), picked)));
                for (i, candidate) in view().enumerate() {
                    if qualifies(candidate) {
                        prop_assert!(candidate.1 <= picked);
                        if candidate.1 == picked {
                            prop_assert!(i >= index);
                        }
                    }
                }
            }
        }
    }
}
