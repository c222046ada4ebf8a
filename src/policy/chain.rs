//! Folding a trust chain's policies into one effective policy, and applying
//! it to leaf metadata.

use serde_json::{Map, Value};

use crate::error::PolicyError;
use crate::observability::{log_debug, log_warn};
use crate::policy::MetadataPolicy;

impl MetadataPolicy {
    /// Folds an ordered sequence of policies into one effective policy.
    ///
    /// Index 0 is the authority closest to the trust anchor; the last element
    /// is the authority immediately superior to the leaf. The fold is
    /// strictly sequential: the first policy naming a parameter contributes
    /// its operation list verbatim, every later policy merges into it
    /// pairwise per operation, and the combined set is re-validated after
    /// each step. The inputs are read-only; the result is a new policy.
    ///
    /// # Errors
    ///
    /// Fails fast on the first conflict, wrapping it in
    /// [`PolicyError::ChainViolation`] with the offending parameter and the
    /// authority's chain index.
    ///
    /// # Examples
    ///
    /// ```
    /// use fedpolicy::MetadataPolicy;
    ///
    /// let anchor: MetadataPolicy =
    ///     r#"{"scopes": {"subset_of": ["openid", "email", "profile"]}}"#.parse()?;
    /// let intermediate: MetadataPolicy =
    ///     r#"{"scopes": {"subset_of": ["openid", "email"], "essential": true}}"#.parse()?;
    ///
    /// let effective = MetadataPolicy::combine(&[anchor, intermediate])?;
    /// assert_eq!(
    ///     effective.to_string(),
    ///     r#"{"scopes":{"subset_of":["openid","email"],"essential":true}}"#
    /// );
    /// # Ok::<(), fedpolicy::PolicyError>(())
    /// ```
    pub fn combine(policies: &[MetadataPolicy]) -> Result<MetadataPolicy, PolicyError> {
        log_debug!("combining {} chain policies", policies.len());

        let mut effective = MetadataPolicy::new();
        for (chain_index, policy) in policies.iter().enumerate() {
            for entry in policy.entries() {
                let merged = match effective.get(entry.parameter()) {
                    Some(existing) => existing.merge(entry).map_err(|error| {
                        log_warn!(
                            "chain authority {} conflicts for parameter \"{}\": {}",
                            chain_index,
                            entry.parameter(),
                            error
                        );
                        error.at_chain_index(entry.parameter(), chain_index)
                    })?,
                    None => {
                        log_debug!(
                            "parameter \"{}\" first declared by chain authority {}",
                            entry.parameter(),
                            chain_index
                        );
                        entry.clone()
                    }
                };
                effective.put(merged);
            }
        }
        Ok(effective)
    }

    /// Applies this policy to a leaf's metadata object, producing the final,
    /// trusted metadata.
    ///
    /// Parameters covered by the policy run through their operation lists in
    /// declared order; parameters the policy does not mention pass through
    /// unchanged. The input is never modified.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Violation`] when a metadata value is incompatible with
    /// an operation's constraint, naming the parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use fedpolicy::MetadataPolicy;
    /// use serde_json::json;
    ///
    /// let policy: MetadataPolicy =
    ///     r#"{"scopes": {"subset_of": ["openid", "email", "profile"]}}"#.parse()?;
    ///
    /// let leaf = json!({"scopes": ["openid", "email", "phone"]});
    /// let metadata = policy.apply(leaf.as_object().unwrap())?;
    /// assert_eq!(metadata["scopes"], json!(["openid", "email"]));
    /// # Ok::<(), fedpolicy::PolicyError>(())
    /// ```
    pub fn apply(&self, metadata: &Map<String, Value>) -> Result<Map<String, Value>, PolicyError> {
        let mut output = Map::new();

        for entry in self.entries() {
            let current = metadata.get(entry.parameter());
            if let Some(result) = entry.apply(current)? {
                output.insert(entry.parameter().to_owned(), result);
            }
        }

        // Parameters without a policy entry pass through in leaf order.
        for (parameter, value) in metadata {
            if self.get(parameter).is_none() {
                output.insert(parameter.clone(), value.clone());
            }
        }

        log_debug!(
            "applied policy with {} entries to metadata with {} parameters",
            self.len(),
            metadata.len()
        );
        Ok(output)
    }
}
