//! Content-based hashing for report ids.

use br_project::schema::SystemDef;
use sha2::{Digest, Sha256};

use crate::params::ReportParams;

pub fn compute_report_id(system: &SystemDef, params: &ReportParams) -> String {
    let mut hasher = Sha256::new();

    let system_json = serde_json::to_string(system).unwrap_or_default();
    hasher.update(system_json.as_bytes());

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> SystemDef {
        serde_yaml::from_str("id: sys1\nname: Test\n").unwrap()
    }

    #[test]
    fn hash_stability() {
        let params = ReportParams::default();
        assert_eq!(
            compute_report_id(&system(), &params),
            compute_report_id(&system(), &params)
        );
    }

    #[test]
    fn hash_differs_for_different_params() {
        let base = ReportParams::default();
        let changed = ReportParams {
            feedstock_price: 0.5,
            ..base
        };
        assert_ne!(
            compute_report_id(&system(), &base),
            compute_report_id(&system(), &changed)
        );
    }
}
