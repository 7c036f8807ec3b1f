use std::path::Path;

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub control: crate::control::Config,
    #[serde(default)]
    pub dns: crate::dns::Config,
    #[serde(default)]
    pub proxy: crate::proxy::Config,
    #[serde(default)]
    pub upstream: crate::proxy::relay::Config,
}

impl Config {
    /// The file is optional: every section carries serde defaults so the
    /// proxy can run with zero setup.
    pub fn load(path: &Path) -> Self {
        let conf = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::default().separator("_"))
            .build()
            .expect("unable to read configuration");
        conf.try_deserialize()
            .expect("configuration format invalid")
    }
}
