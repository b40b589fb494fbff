//! Seed data for the catalog
//!
//! The service ships with a built-in plan list. A JSON file with the same
//! shape (an array of plans, camelCase keys) can replace it at startup.

use anyhow::{Context, Result};
use plan_advisor_shared::Plan;
use std::path::Path;
use tracing::info;

/// Load plans from a JSON seed file
pub fn load_seed_file(path: &Path) -> Result<Vec<Plan>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let plans: Vec<Plan> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    info!(count = plans.len(), path = %path.display(), "Loaded plan seed file");
    Ok(plans)
}

/// Built-in catalog
pub fn default_plans() -> Vec<Plan> {
    [
        (1, "Fibra 100", "Vivo", "São Paulo", "100Mbps", 99.90, 200),
        (2, "Fibra 300", "Vivo", "São Paulo", "300Mbps", 129.90, 400),
        (3, "Fibra 1 Giga", "Vivo", "São Paulo", "1 Gbps", 249.90, 1000),
        (4, "Claro Net 250", "Claro", "São Paulo", "250 Mbps", 119.90, 300),
        (5, "Claro Net 500", "Claro", "São Paulo", "500 Mbps", 169.90, 600),
        (6, "TIM Live 50", "TIM", "São Paulo", "50Mbps", 69.90, 100),
        (7, "Claro Net 100", "Claro", "Rio de Janeiro", "100 Mbps", 89.90, 150),
        (8, "Claro Net 600", "Claro", "Rio de Janeiro", "600 Mbps", 189.90, 800),
        (9, "Oi Fibra 200", "Oi", "Rio de Janeiro", "200Mbps", 109.90, 300),
        (10, "Oi Fibra 1 Giga", "Oi", "Rio de Janeiro", "1Gbps", 229.90, 1000),
        (11, "Vivo Fibra 500", "Vivo", "Rio de Janeiro", "500Mbps", 159.90, 500),
        (12, "TIM Live 300", "TIM", "Belo Horizonte", "300Mbps", 119.90, 350),
        (13, "Oi Fibra 100", "Oi", "Belo Horizonte", "100Mbps", 79.90, 120),
        (14, "Vivo Fibra 700", "Vivo", "Belo Horizonte", "700 Mbps", 199.90, 700),
        (15, "Claro Net 350", "Claro", "Curitiba", "350 Mbps", 139.90, 450),
        (16, "TIM Live 1 Giga", "TIM", "Curitiba", "1 Gbps", 219.90, 1000),
        (17, "Vivo Fibra 150", "Vivo", "Curitiba", "150Mbps", 94.90, 180),
        (18, "Oi Fibra 400", "Oi", "Porto Alegre", "400Mbps", 149.90, 500),
        (19, "Claro Net 80", "Claro", "Porto Alegre", "80 Mbps", 74.90, 100),
        (20, "Vivo Fibra 2 Giga", "Vivo", "Porto Alegre", "2 Gbps", 349.90, 2000),
    ]
    .into_iter()
    .map(|(id, name, operator, city, speed, price, data_cap)| Plan {
        id,
        name: name.to_string(),
        operator: operator.to_string(),
        city: city.to_string(),
        speed: speed.to_string(),
        price,
        data_cap,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryPlanRepository;
    use plan_advisor_shared::extract_speed_in_mbps;
    use std::io::Write;

    #[test]
    fn test_default_plans_are_a_valid_seed() {
        let plans = default_plans();
        assert_eq!(plans.len(), 20);
        assert!(plans.iter().all(|p| extract_speed_in_mbps(&p.speed) > 0.0));
        assert!(MemoryPlanRepository::new(plans).is_ok());
    }

    #[test]
    fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "name": "Mini", "operator": "Oi", "city": "Recife",
                 "speed": "30Mbps", "price": 49.9, "dataCap": 50}}]"#
        )
        .unwrap();

        let plans = load_seed_file(file.path()).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].city, "Recife");
        assert_eq!(plans[0].data_cap, 50);
    }

    #[test]
    fn test_load_seed_file_errors() {
        assert!(load_seed_file(Path::new("/nonexistent/plans.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_seed_file(file.path()).is_err());
    }
}
