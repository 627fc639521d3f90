impl MigrationPlan {
    /// Resolves the rules crossed when moving from `previous` to the running version.
    ///
    /// A rule is crossed when `previous < threshold <= running`. A missing
    /// previous version crosses every rule. Rules come back in ascending
    /// threshold order; equal thresholds keep registration order.
    pub fn rules_between(&self, previous: Option<&PluginVersion>) -> Vec<&MigrationRule> {
        let mut crossed = self
            .rules
            .iter()
            .filter(|rule| rule.threshold <= self.running_version)
            .filter(|rule| match previous {
                Some(previous) => *previous < rule.threshold,
                None => true,
            })
            .collect::<Vec<_>>();
        // stable sort keeps registration order within one threshold
        crossed.sort_by(|a, b| a.threshold.cmp(&b.threshold));
        crossed
    }

    /// Applies every crossed rule to `store`, returning the names of the rules that ran.
    pub fn apply(&self, store: &dyn SettingsStore, previous: Option<&PluginVersion>) -> Result<Vec<String>> {
        self.validate()?;

        let mut applied = Vec::new();
        for rule in self.rules_between(previous) {
            rule.apply(store)?;
            applied.push(rule.name.clone());
        }
        Ok(applied)
    }
}
