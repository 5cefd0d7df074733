//! workerd configuration rendering.

use std::net::SocketAddr;

use edgetypes_core::DescriptorProfile;

/// Service name the descriptor worker is registered under.
pub const SERVICE_NAME: &str = "descriptor";

/// Render a workerd config serving `module_name` on `address`.
///
/// The module is embedded relative to the config file, so both must live in
/// the same directory.
pub fn render_config(
    module_name: &str,
    address: SocketAddr,
    profile: &DescriptorProfile,
) -> String {
    let flags = profile
        .compatibility_flags
        .iter()
        .map(|flag| format!("\"{}\"", flag))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"using Workerd = import "/workerd/workerd.capnp";

const config :Workerd.Config = (
  services = [ (name = "{service}", worker = .descriptorWorker) ],
  sockets = [ (name = "http", address = "{address}", http = (), service = "{service}") ],
);

const descriptorWorker :Workerd.Worker = (
  modules = [ (name = "{module}", esModule = embed "{module}") ],
  compatibilityDate = "{date}",
  compatibilityFlags = [{flags}],
);
"#,
        service = SERVICE_NAME,
        address = address,
        module = module_name,
        date = profile.compatibility_date,
        flags = flags,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgetypes_core::DESCRIPTOR_PROFILE;

    #[test]
    fn test_render_config() {
        let address: SocketAddr = "127.0.0.1:40123".parse().unwrap();
        let config = render_config("worker.mjs", address, &DESCRIPTOR_PROFILE);

        assert!(config.contains(r#"address = "127.0.0.1:40123""#));
        assert!(config.contains(r#"esModule = embed "worker.mjs""#));
        assert!(config.contains(r#"compatibilityDate = "2024-01-01""#));
        assert!(config.contains(r#"compatibilityFlags = ["nodejs_compat", "rtti_api"]"#));
    }

    #[test]
    fn test_render_config_without_flags() {
        let profile = DescriptorProfile {
            compatibility_date: "2023-01-01",
            compatibility_flags: &[],
        };
        let address: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = render_config("types.mjs", address, &profile);

        assert!(config.contains("compatibilityFlags = [],"));
    }
}
