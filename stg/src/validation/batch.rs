// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Batch validator - validates many items under an enforcement mode
// and keeps running statistics

use crate::config::{EnforcementMode, ValidationConfig};
use crate::schema::Schema;

use super::{Validatable, Validator};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationStats {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub skipped_records: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationStats {
    /// Share of accepted records, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_records > 0 {
            (self.valid_records as f64 / self.total_records as f64) * 100.0
        } else {
            100.0
        }
    }
}

/// Validates a sequence of items against one schema
pub struct BatchValidator<'s> {
    validator: Validator<'s>,
    config: ValidationConfig,
    stats: ValidationStats,
}

impl<'s> BatchValidator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, ValidationConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: ValidationConfig) -> Self {
        Self {
            validator: Validator::new(schema),
            config,
            stats: ValidationStats::default(),
        }
    }

    /// Validate one item; returns whether it was accepted. `label`
    /// identifies the item in recorded warnings and errors.
    pub fn validate_item<'a>(&mut self, label: &str, item: impl Into<Validatable<'a>>) -> bool {
        self.stats.total_records += 1;

        if !self.config.should_validate() {
            self.stats.valid_records += 1;
            self.stats.skipped_records += 1;
            return true;
        }

        match self.validator.validate(item) {
            Ok(_) => {
                self.stats.valid_records += 1;
                true
            }
            Err(err) => match self.config.mode {
                EnforcementMode::Strict => {
                    self.stats.invalid_records += 1;
                    self.stats.errors.push(format!("{}: {}", label, err));
                    false
                }
                _ => {
                    if self.config.log_warnings {
                        log::warn!("{}: {}", label, err);
                    }
                    self.stats.warnings.push(format!("{}: {}", label, err));
                    self.stats.valid_records += 1;
                    true
                }
            },
        }
    }

    /// Validate labelled items in order; returns one acceptance flag per
    /// item processed
    pub fn validate_all<'a, I, L>(&mut self, items: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (L, Validatable<'a>)>,
        L: AsRef<str>,
    {
        let mut results = Vec::new();
        for (label, item) in items {
            let accepted = self.validate_item(label.as_ref(), item);
            results.push(accepted);
            if !accepted && self.config.stop_on_first_error {
                log::debug!("Stopping batch after first rejected item");
                break;
            }
        }
        results
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn set_mode(&mut self, mode: EnforcementMode) {
        self.config.mode = mode;
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ValidationStats::default();
    }

    /// Get a summary of validation results
    pub fn summary(&self) -> String {
        let stats = &self.stats;
        format!(
            "Validation Summary ({} mode):\n\
             Total Records: {}\n\
             Valid Records: {} ({:.2}%)\n\
             Invalid Records: {}\n\
             Warnings: {}\n\
             Errors: {}",
            self.config.mode,
            stats.total_records,
            stats.valid_records,
            stats.success_rate(),
            stats.invalid_records,
            stats.warnings.len(),
            stats.errors.len()
        )
    }
}
