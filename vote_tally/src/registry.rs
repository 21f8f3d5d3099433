use log::{debug, info};
use std::collections::HashMap;

use crate::anonymizer::{check_code_length, compute_code, is_well_formed, normalize_email};
pub use crate::config::*;

/// What happened to one line of voter input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RegisterOutcome {
    Valid(VoterCode),
    /// The email was already registered.
    Duplicate,
    /// The input does not look like an email.
    Skipped,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct RegistrationStats {
    pub valid: usize,
    pub duplicate: usize,
    pub skipped: usize,
}

/// A builder for the voter registry.
///
/// The registry can only be changed while it is being built.
///
/// ```
/// use vote_tally::registry::{RegisterOutcome, RegistryBuilder};
///
/// let mut builder = RegistryBuilder::new("fav-color", 12)?;
/// builder.add_email("anna@example.org", "acme")?;
/// assert_eq!(builder.add_line("ANNA@example.org\n")?, RegisterOutcome::Duplicate);
/// assert_eq!(builder.add_line("not an address")?, RegisterOutcome::Skipped);
///
/// let registry = builder.build();
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.records()[0].organization, "ACME");
/// # Ok::<(), vote_tally::TallyError>(())
/// ```
pub struct RegistryBuilder {
    _salt: String,
    _code_len: usize,
    _records: Vec<VoterRecord>,
    _by_code: HashMap<VoterCode, usize>,
    _by_email: HashMap<String, usize>,
    _stats: RegistrationStats,
}

impl RegistryBuilder {
    pub fn new(salt: &str, code_len: usize) -> Result<RegistryBuilder, TallyError> {
        check_code_length(code_len)?;
        Ok(RegistryBuilder {
            _salt: salt.to_string(),
            _code_len: code_len,
            _records: Vec::new(),
            _by_code: HashMap::new(),
            _by_email: HashMap::new(),
            _stats: RegistrationStats::default(),
        })
    }

    /// Registers one voter with its organization.
    ///
    /// Fails if the code of a new email is already taken by another email.
    pub fn add_email(
        &mut self,
        email: &str,
        organization: &str,
    ) -> Result<RegisterOutcome, TallyError> {
        if !email.contains('@') {
            debug!("add_email: skipping {:?}", email);
            self._stats.skipped += 1;
            return Ok(RegisterOutcome::Skipped);
        }
        let clean_email = normalize_email(email);
        if self._by_email.contains_key(&clean_email) {
            debug!("add_email: duplicate {:?}", clean_email);
            self._stats.duplicate += 1;
            return Ok(RegisterOutcome::Duplicate);
        }
        let code = compute_code(&self._salt, &clean_email, self._code_len)?;
        self.insert(clean_email, organization, code.clone())?;
        self._stats.valid += 1;
        Ok(RegisterOutcome::Valid(code))
    }

    /// Registers a line of a plain text email list. The organization is left blank.
    pub fn add_line(&mut self, line: &str) -> Result<RegisterOutcome, TallyError> {
        self.add_email(line, "")
    }

    /// Adds a voter whose code was produced by an earlier run.
    ///
    /// The code is taken as is. Damaged codes are caught by [`Registry::check_integrity`].
    pub fn restore(
        &mut self,
        email: &str,
        organization: &str,
        code: &str,
    ) -> Result<RegisterOutcome, TallyError> {
        let clean_email = normalize_email(email);
        if self._by_email.contains_key(&clean_email) {
            self._stats.duplicate += 1;
            return Ok(RegisterOutcome::Duplicate);
        }
        let code = VoterCode(code.trim().to_lowercase());
        self.insert(clean_email, organization, code.clone())?;
        self._stats.valid += 1;
        Ok(RegisterOutcome::Valid(code))
    }

    fn insert(
        &mut self,
        clean_email: String,
        organization: &str,
        code: VoterCode,
    ) -> Result<(), TallyError> {
        if let Some(idx) = self._by_code.get(&code) {
            return Err(TallyError::CodeCollision {
                code,
                email: clean_email,
                existing_email: self._records[*idx].email.clone(),
            });
        }
        let idx = self._records.len();
        self._by_code.insert(code.clone(), idx);
        self._by_email.insert(clean_email.clone(), idx);
        self._records.push(VoterRecord {
            code,
            email: clean_email,
            organization: organization.trim().to_uppercase(),
        });
        Ok(())
    }

    pub fn stats(&self) -> RegistrationStats {
        self._stats
    }

    pub fn build(self) -> Registry {
        info!(
            "Registry: {} voters, {} duplicates, {} skipped",
            self._stats.valid, self._stats.duplicate, self._stats.skipped
        );
        Registry {
            salt: self._salt,
            code_len: self._code_len,
            records: self._records,
            by_code: self._by_code,
            stats: self._stats,
        }
    }
}

/// The registered voters, indexed by code.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Registry {
    salt: String,
    code_len: usize,
    records: Vec<VoterRecord>,
    by_code: HashMap<VoterCode, usize>,
    stats: RegistrationStats,
}

impl Registry {
    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn code_len(&self) -> usize {
        self.code_len
    }

    /// The voters in registration order.
    pub fn records(&self) -> &[VoterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> RegistrationStats {
        self.stats
    }

    pub fn contains(&self, code: &VoterCode) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn lookup(&self, code: &VoterCode) -> Option<&VoterRecord> {
        self.by_code.get(code).map(|idx| &self.records[*idx])
    }

    /// The lines of the codefile: (email, organization, code) in registration order.
    pub fn emit_codefile(&self) -> Vec<(String, String, VoterCode)> {
        self.records
            .iter()
            .map(|r| (r.email.clone(), r.organization.clone(), r.code.clone()))
            .collect()
    }

    /// Checks that every registered code is usable for matching votes.
    pub fn check_integrity(&self) -> Result<(), TallyError> {
        for r in self.records.iter() {
            if !is_well_formed(&r.code, self.code_len) {
                return Err(TallyError::InvalidVoterCode {
                    code: r.code.clone(),
                    email: r.email.clone(),
                });
            }
        }
        Ok(())
    }
}
