impl MigrationPlan {
    /// Creates an empty plan for the running version.
    pub fn new(running_version: PluginVersion) -> Self {
        Self {
            running_version,
            rules: Vec::new(),
        }
    }

    /// The plan shipped with the plugin.
    ///
    /// Rules whose threshold is newer than `running_version` are left out.
    pub fn standard(running_version: PluginVersion, keys: &crate::config::OptionKeys) -> Result<Self> {
        let mut plan = Self::new(running_version);
        let renames = [
            ("1.4.0", "xmlrpc_enabled", "xmlrpc_disabled"),
            ("1.4.0", "login_remove_wp_logo", "login_replace_wp_logo_link"),
        ];
        for (threshold, old_name, new_name) in renames {
            let rule = MigrationRule::rename(threshold, &keys.option(old_name), &keys.option(new_name))?;
            if rule.threshold <= plan.running_version {
                plan.add_rule(rule)?;
            }
        }
        Ok(plan)
    }

    /// Returns the version this plan migrates to.
    pub fn running_version(&self) -> &PluginVersion {
        &self.running_version
    }

    /// Returns the registered rules in registration order.
    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    /// Adds a rule. The plan is left unchanged if the rule is invalid.
    pub fn add_rule(&mut self, rule: MigrationRule) -> Result<()> {
        self.check_rule(&rule)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Fluent builder method to add a rule.
    pub fn with_rule(mut self, rule: MigrationRule) -> Result<Self> {
        self.add_rule(rule)?;
        Ok(self)
    }

    /// Helper to add a rename rule.
    pub fn add_rename(&mut self, threshold: &str, old_key: &str, new_key: &str) -> Result<()> {
        self.add_rule(MigrationRule::rename(threshold, old_key, new_key)?)
    }

    /// Validates the integrity of the whole plan.
    ///
    /// Checks for:
    /// - thresholds not newer than the running version,
    /// - duplicate rule names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::<&str>::new();
        for rule in &self.rules {
            self.check_threshold(rule)?;
            if !seen.insert(rule.name.as_str()) {
                return Err(SettingsError::InvalidPlan(format!(
                    "Duplicate migration rule '{}'",
                    rule.name
                )));
            }
        }
        Ok(())
    }

    fn check_rule(&self, rule: &MigrationRule) -> Result<()> {
        self.check_threshold(rule)?;
        if self.rules.iter().any(|existing| existing.name == rule.name) {
            return Err(SettingsError::InvalidPlan(format!(
                "Duplicate migration rule '{}'",
                rule.name
            )));
        }
        Ok(())
    }

    fn check_threshold(&self, rule: &MigrationRule) -> Result<()> {
        if rule.threshold > self.running_version {
            return Err(SettingsError::InvalidPlan(format!(
                "Migration rule '{}' targets {} which is newer than running version {}",
                rule.name, rule.threshold, self.running_version
            )));
        }
        Ok(())
    }
}
