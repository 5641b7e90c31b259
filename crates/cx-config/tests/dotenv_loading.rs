//! `.env` values flow through the environment layer.
//!
//! Kept in its own test binary: dotenvy writes the process environment and
//! the variable outlives the jail.

use cx_config::CxConfig;
use figment::Jail;

#[test]
fn dotenv_file_feeds_env_layer() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "CXGEN_GENERAL__DLL_NAME=dxgi.dll\n")?;

        let config = CxConfig::load_with_dotenv().expect("config loads");
        assert_eq!(config.general.dll_name.as_deref(), Some("dxgi.dll"));
        Ok(())
    });
}
