//! Service endpoint configuration for the smoke run.
//!
//! The service table is fixed at startup and never mutated. Base URLs default
//! to the local compose stack's published ports and can be overridden per
//! service via `COACHARTIE_<NAME>_URL` environment variables.

/// One target service of the smoke run.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub base_url: String,
}

/// Immutable endpoint table for the deployed stack.
///
/// The capabilities service doubles as the target of the functional probes
/// (task listing, task execution, chat), so its base URL is kept separately.
#[derive(Debug, Clone)]
pub struct StackConfig {
    pub services: Vec<ServiceDescriptor>,
    pub capabilities_url: String,
}

impl StackConfig {
    /// Build the default four-service table, honoring env overrides.
    pub fn from_env() -> Self {
        let capabilities = service("capabilities", 9991);
        let capabilities_url = capabilities.base_url.clone();

        Self {
            services: vec![
                capabilities,
                service("brain", 9992),
                service("sms", 9993),
                service("email", 9994),
            ],
            capabilities_url,
        }
    }
}

fn service(name: &'static str, default_port: u16) -> ServiceDescriptor {
    let env_key = format!("COACHARTIE_{}_URL", name.to_uppercase());
    let base_url = std::env::var(&env_key)
        .unwrap_or_else(|_| format!("http://localhost:{default_port}"));

    ServiceDescriptor { name, base_url }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_table() {
        let config = StackConfig::from_env();

        assert_eq!(config.services.len(), 4);
        let names: Vec<&str> = config.services.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["capabilities", "brain", "sms", "email"]);
    }

    #[test]
    fn test_capabilities_url_matches_table_entry() {
        let config = StackConfig::from_env();

        let capabilities = config
            .services
            .iter()
            .find(|s| s.name == "capabilities")
            .expect("capabilities service should be in the table");
        assert_eq!(capabilities.base_url, config.capabilities_url);
    }
}
