//! The filter expression tree edited by the filter UI.
//!
//! A [`FilterExpression`] ANDs its [`Group`]s, a group ORs its [`SubGroup`]s,
//! and a subgroup ANDs its [`Condition`]s.
//!
//! Every edit takes `&self` and returns a new snapshot. Readers (the
//! compiler, the validation oracle) only ever see a finished tree.
//!
//! ```rust
//! use tessera_query::{FilterExpression, NodePath};
//! use tessera_schema::RecordType;
//!
//! let expr = FilterExpression::new(RecordType::Account);
//! let path = NodePath::new(0, 0, 0);
//! let edited = expr
//!     .set_property(path, "name")?
//!     .set_operator(path, "contains")?
//!     .set_value(path, "Acme")?;
//!
//! assert!(expr.is_blank());
//! assert!(!edited.is_blank());
//! # Ok::<(), tessera_query::EditError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_schema::{RecordType, deserialize_optional_record_type};

use crate::error::{EditError, ParseError};
use crate::operator::arity_for_key;
use crate::value::FilterValue;

/// Maximum size of filter JSON in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Position of a condition in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePath {
    /// Group index.
    pub group: usize,
    /// Subgroup index within the group.
    pub sub_group: usize,
    /// Condition index within the subgroup.
    pub condition: usize,
}

impl NodePath {
    /// Create a path.
    pub const fn new(group: usize, sub_group: usize, condition: usize) -> Self {
        Self {
            group,
            sub_group,
            condition,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "groups[{}].subGroups[{}].conditions[{}]",
            self.group, self.sub_group, self.condition
        )
    }
}

/// A single `property operator value` comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Property key, empty until chosen.
    #[serde(default)]
    pub property: String,
    /// Operator key, empty until chosen.
    #[serde(default)]
    pub operator: String,
    /// Entered value.
    #[serde(default)]
    pub value: FilterValue,
}

impl Condition {
    /// Create a condition.
    pub fn new(
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            property: property.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// A condition with nothing chosen yet.
    pub fn incomplete() -> Self {
        Self::default()
    }

    /// Whether both a property and an operator have been chosen.
    ///
    /// Incomplete conditions are skipped by the compiler rather than
    /// rejected.
    pub fn is_complete(&self) -> bool {
        !self.property.trim().is_empty() && !self.operator.trim().is_empty()
    }
}

/// Conditions combined with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGroup {
    /// The conditions, in order.
    pub conditions: Vec<Condition>,
}

impl SubGroup {
    /// Create a subgroup.
    pub fn new(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
        }
    }
}

impl Default for SubGroup {
    fn default() -> Self {
        Self {
            conditions: vec![Condition::incomplete()],
        }
    }
}

/// Subgroups combined with OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// The subgroups, in order.
    pub sub_groups: Vec<SubGroup>,
}

impl Group {
    /// Create a group.
    pub fn new(sub_groups: impl IntoIterator<Item = SubGroup>) -> Self {
        Self {
            sub_groups: sub_groups.into_iter().collect(),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self {
            sub_groups: vec![SubGroup::default()],
        }
    }
}

/// A complete filter: groups combined with AND, scoped to one record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExpression {
    /// Record type being filtered; `None` until the user picks one.
    #[serde(default, deserialize_with = "deserialize_optional_record_type")]
    pub record_type: Option<RecordType>,
    /// The groups, in order.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl FilterExpression {
    /// Create the initial expression: one group, one subgroup, one
    /// incomplete condition.
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type: Some(record_type),
            groups: vec![Group::default()],
        }
    }

    /// Build an expression from explicit groups.
    pub fn from_groups(record_type: RecordType, groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            record_type: Some(record_type),
            groups: groups.into_iter().collect(),
        }
    }

    /// Parse an expression from the JSON sent by the filter UI.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        if json.len() > MAX_FILTER_JSON_SIZE {
            return Err(ParseError::TooLarge {
                size: json.len(),
                limit: MAX_FILTER_JSON_SIZE,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the expression to JSON.
    pub fn to_json(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Switch record type.
    ///
    /// Properties belong to the old record type's schema, so the tree
    /// starts over in its initial shape.
    #[must_use]
    pub fn with_record_type(&self, record_type: RecordType) -> Self {
        Self::new(record_type)
    }

    /// Get a condition.
    pub fn condition(&self, path: NodePath) -> Option<&Condition> {
        self.groups
            .get(path.group)?
            .sub_groups
            .get(path.sub_group)?
            .conditions
            .get(path.condition)
    }

    /// Iterate over every condition with its path, in tree order.
    pub fn conditions(&self) -> impl Iterator<Item = (NodePath, &Condition)> {
        self.groups.iter().enumerate().flat_map(|(g, group)| {
            group.sub_groups.iter().enumerate().flat_map(move |(s, sub)| {
                sub.conditions
                    .iter()
                    .enumerate()
                    .map(move |(c, cond)| (NodePath::new(g, s, c), cond))
            })
        })
    }

    /// Total number of conditions, complete or not.
    pub fn condition_count(&self) -> usize {
        self.conditions().count()
    }

    /// Whether no condition is complete yet.
    pub fn is_blank(&self) -> bool {
        !self.conditions().any(|(_, c)| c.is_complete())
    }

    /// Append a group holding one incomplete condition.
    #[must_use]
    pub fn add_group(&self) -> Self {
        let mut next = self.clone();
        next.groups.push(Group::default());
        next
    }

    /// Append a subgroup holding one incomplete condition.
    pub fn add_sub_group(&self, group: usize) -> Result<Self, EditError> {
        let mut next = self.clone();
        next.group_mut(group)?.sub_groups.push(SubGroup::default());
        Ok(next)
    }

    /// Append an incomplete condition to a subgroup.
    pub fn add_condition(&self, group: usize, sub_group: usize) -> Result<Self, EditError> {
        let mut next = self.clone();
        next.sub_group_mut(group, sub_group)?
            .conditions
            .push(Condition::incomplete());
        Ok(next)
    }

    /// Remove a group.
    pub fn remove_group(&self, group: usize) -> Result<Self, EditError> {
        if group >= self.groups.len() {
            return Err(EditError::GroupOutOfRange { group });
        }
        let mut next = self.clone();
        next.groups.remove(group);
        Ok(next)
    }

    /// Remove a subgroup. Removing a group's last subgroup removes the group.
    pub fn remove_sub_group(&self, group: usize, sub_group: usize) -> Result<Self, EditError> {
        let mut next = self.clone();
        let target = next.group_mut(group)?;
        if sub_group >= target.sub_groups.len() {
            return Err(EditError::SubGroupOutOfRange { group, sub_group });
        }
        target.sub_groups.remove(sub_group);
        if target.sub_groups.is_empty() {
            next.groups.remove(group);
        }
        Ok(next)
    }

    /// Remove a condition. Removing a subgroup's last condition removes the
    /// subgroup, which may in turn remove the group.
    pub fn remove_condition(&self, path: NodePath) -> Result<Self, EditError> {
        let mut next = self.clone();
        let target = next.condition_parent_mut(path)?;
        target.conditions.remove(path.condition);
        if target.conditions.is_empty() {
            return next.remove_sub_group(path.group, path.sub_group);
        }
        Ok(next)
    }

    /// Choose a property. Operator and value are cleared since the legal
    /// operators depend on the property's type.
    pub fn set_property(&self, path: NodePath, property: impl Into<String>) -> Result<Self, EditError> {
        let mut next = self.clone();
        let condition = next.condition_mut(path)?;
        condition.property = property.into();
        condition.operator.clear();
        condition.value = FilterValue::Null;
        Ok(next)
    }

    /// Choose an operator. The value is cleared when the new operator takes
    /// a different number of values than the old one.
    pub fn set_operator(&self, path: NodePath, operator: impl Into<String>) -> Result<Self, EditError> {
        let mut next = self.clone();
        let condition = next.condition_mut(path)?;
        let operator = operator.into();
        if arity_for_key(&condition.operator) != arity_for_key(&operator) {
            condition.value = FilterValue::Null;
        }
        condition.operator = operator;
        Ok(next)
    }

    /// Set a condition's value.
    pub fn set_value(&self, path: NodePath, value: impl Into<FilterValue>) -> Result<Self, EditError> {
        let mut next = self.clone();
        next.condition_mut(path)?.value = value.into();
        Ok(next)
    }

    fn group_mut(&mut self, group: usize) -> Result<&mut Group, EditError> {
        self.groups
            .get_mut(group)
            .ok_or(EditError::GroupOutOfRange { group })
    }

    fn sub_group_mut(&mut self, group: usize, sub_group: usize) -> Result<&mut SubGroup, EditError> {
        self.group_mut(group)?
            .sub_groups
            .get_mut(sub_group)
            .ok_or(EditError::SubGroupOutOfRange { group, sub_group })
    }

    fn condition_parent_mut(&mut self, path: NodePath) -> Result<&mut SubGroup, EditError> {
        let sub = self
            .sub_group_mut(path.group, path.sub_group)
            .map_err(|_| EditError::ConditionOutOfRange { path })?;
        if path.condition >= sub.conditions.len() {
            return Err(EditError::ConditionOutOfRange { path });
        }
        Ok(sub)
    }

    fn condition_mut(&mut self, path: NodePath) -> Result<&mut Condition, EditError> {
        let sub = self.condition_parent_mut(path)?;
        Ok(&mut sub.conditions[path.condition])
    }
}
