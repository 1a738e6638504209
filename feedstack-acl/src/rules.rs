//! ACL documents.
//!
//! ```xml
//! <entity>
//!   <acl repeatable="true">
//!     <resourceInfo><resourceRule>/</resourceRule></resourceInfo>
//!     <authorizedEntities repeatable="true">
//!       <operation>retrieve</operation>
//!       <entities repeatable="true">user1@example.com</entities>
//!     </authorizedEntities>
//!   </acl>
//! </entity>
//! ```

use std::collections::{BTreeMap, BTreeSet};

use feedstack_model::{decode_element, Entity, PropertyValue};
use feedstack_types::{Operation, ResourcePath};

use crate::error::{AclError, AclResult};

const ACL: &str = "acl";
const RESOURCE_INFO: &str = "resourceInfo";
const RESOURCE_RULE: &str = "resourceRule";
const AUTHORIZED_ENTITIES: &str = "authorizedEntities";
const OPERATION: &str = "operation";
const ENTITIES: &str = "entities";

/// Principals allowed to perform each operation on a resource.
pub type OperationPrincipals = BTreeMap<Operation, BTreeSet<String>>;

/// Resource path → operation → principals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclRules {
    resources: BTreeMap<ResourcePath, OperationPrincipals>,
}

impl AclRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an ACL document. The root is either a single `<acl>` rule or
    /// any element holding `<acl>` rules. Rules naming the same resource
    /// are merged.
    pub fn from_document(document: &str) -> AclResult<Self> {
        let (root, entity) = decode_element(document)?;
        let mut rules = Self::new();
        if root == ACL {
            rules.add_rule(&entity)?;
            return Ok(rules);
        }
        for item in entity.get(ACL).map(PropertyValue::items).into_iter().flatten() {
            match item {
                PropertyValue::Group(rule) => rules.add_rule(rule)?,
                PropertyValue::Empty => {}
                PropertyValue::Scalar(_) | PropertyValue::Repeated(_) => {
                    return Err(AclError::InvalidRule("acl entry has no resourceInfo".into()));
                }
            }
        }
        Ok(rules)
    }

    /// Adds `principal` to the principals allowed `operation` on `path`.
    pub fn allow(&mut self, path: ResourcePath, operation: Operation, principal: impl Into<String>) {
        self.resources
            .entry(path)
            .or_default()
            .entry(operation)
            .or_default()
            .insert(principal.into());
    }

    #[must_use]
    pub fn with(mut self, path: ResourcePath, operation: Operation, principal: impl Into<String>) -> Self {
        self.allow(path, operation, principal);
        self
    }

    pub fn resource(&self, path: &ResourcePath) -> Option<&OperationPrincipals> {
        self.resources.get(path)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourcePath> {
        self.resources.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn add_rule(&mut self, rule: &Entity) -> AclResult<()> {
        let path = rule
            .get_group(RESOURCE_INFO)
            .and_then(|info| info.get_str(RESOURCE_RULE))
            .ok_or_else(|| AclError::InvalidRule(format!("missing {RESOURCE_INFO}/{RESOURCE_RULE}")))?;
        let path = ResourcePath::parse(path).map_err(|e| AclError::InvalidRule(e.to_string()))?;

        // A rule with no grants still defines the resource.
        let operations = self.resources.entry(path.clone()).or_default();
        for grant in rule
            .get(AUTHORIZED_ENTITIES)
            .map(PropertyValue::items)
            .into_iter()
            .flatten()
        {
            let Some(grant) = grant.as_group() else {
                return Err(AclError::InvalidRule(format!(
                    "{AUTHORIZED_ENTITIES} for '{path}' has no operation"
                )));
            };
            let operation: Operation = grant
                .get_str(OPERATION)
                .ok_or_else(|| AclError::InvalidRule(format!("{AUTHORIZED_ENTITIES} for '{path}' has no operation")))?
                .parse()
                .map_err(|e: feedstack_types::Error| AclError::InvalidRule(e.to_string()))?;

            let principals = operations.entry(operation).or_default();
            for principal in grant.get(ENTITIES).map(PropertyValue::items).into_iter().flatten() {
                if let Some(principal) = principal.as_str().map(str::trim).filter(|p| !p.is_empty()) {
                    principals.insert(principal.to_string());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_acl_root_is_one_rule() {
        let rules = AclRules::from_document(
            "<acl><resourceInfo><resourceRule>/7</resourceRule></resourceInfo>\
             <authorizedEntities><operation>delete</operation><entities>a@x.com</entities></authorizedEntities></acl>",
        )
        .unwrap();
        let ops = rules.resource(&ResourcePath::Entry("7".into())).unwrap();
        assert!(ops[&Operation::Delete].contains("a@x.com"));
    }

    #[test]
    fn rule_without_grants_defines_resource() {
        let rules = AclRules::from_document(
            "<entity><acl><resourceInfo><resourceRule>/</resourceRule></resourceInfo></acl></entity>",
        )
        .unwrap();
        assert!(rules.resource(&ResourcePath::Feed).unwrap().is_empty());
    }

    #[test]
    fn empty_document_has_no_rules() {
        assert!(AclRules::from_document("<entity/>").unwrap().is_empty());
    }
}
