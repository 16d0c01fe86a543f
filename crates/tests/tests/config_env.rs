use std::path::PathBuf;

use anyhow::Result;
use bridge_core::BridgeConfig;
use serial_test::serial;

#[test]
#[serial]
fn defaults_apply_without_env() -> Result<()> {
    let _port = EnvGuard::unset("BRIDGE_PORT");
    let _dir = EnvGuard::unset("BRIDGE_FUNCTIONS_DIR");

    let config = BridgeConfig::from_env()?;
    assert_eq!(config.port, 8888);
    assert_eq!(config.functions_dir, PathBuf::from("netlify/functions"));
    Ok(())
}

#[test]
#[serial]
fn env_overrides_port_and_functions_dir() -> Result<()> {
    let _port = EnvGuard::set("BRIDGE_PORT", "9123");
    let _dir = EnvGuard::set("BRIDGE_FUNCTIONS_DIR", "apps/console/netlify/functions");

    let config = BridgeConfig::from_env()?;
    assert_eq!(config.port, 9123);
    assert_eq!(
        config.functions_dir,
        PathBuf::from("apps/console/netlify/functions")
    );
    Ok(())
}

#[test]
#[serial]
fn invalid_port_is_rejected() {
    let _port = EnvGuard::set("BRIDGE_PORT", "70000");

    let err = BridgeConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("BRIDGE_PORT `70000`"));
}

#[test]
#[serial]
fn port_flag_takes_precedence_over_env() -> Result<()> {
    let _port = EnvGuard::set("BRIDGE_PORT", "9123");

    let config = BridgeConfig::from_env()?.with_port(Some(7000));
    assert_eq!(config.port, 7000);
    let config = BridgeConfig::from_env()?.with_port(None);
    assert_eq!(config.port, 9123);
    Ok(())
}

struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe {
            std::env::set_var(key, value.as_ref());
        }
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(ref value) = self.prev {
            unsafe {
                std::env::set_var(self.key, value);
            }
        } else {
            unsafe {
                std::env::remove_var(self.key);
            }
        }
    }
}
