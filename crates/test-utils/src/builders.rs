use hotrun::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_extensions(mut self, exts: &[&str]) -> Self {
        self.config.watch.extensions = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_static_extensions(mut self, exts: &[&str]) -> Self {
        self.config.watch.static_extensions = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_reload(mut self, enabled: bool) -> Self {
        self.config.reload.enabled = enabled;
        self
    }

    pub fn with_vendor(mut self, enabled: bool) -> Self {
        self.config.watch.watch_vendor = enabled;
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.config.build.tags = tags.to_string();
        self
    }

    pub fn with_pre_install(mut self, enabled: bool) -> Self {
        self.config.build.pre_install = enabled;
        self
    }

    pub fn with_env(mut self, entry: &str) -> Self {
        self.config.run.envs.push(entry.to_string());
        self
    }

    pub fn with_run_args(mut self, args: &[&str]) -> Self {
        self.config.run.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The unvalidated form, for exercising validation failures.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
