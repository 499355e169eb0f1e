use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};

/// A link of the formatting inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeLevel {
    Run,
    Paragraph,
    Shape,
    Layout,
    Master,
    Theme,
    /// Nothing in the chain defined the property.
    HardDefault,
}

impl CascadeLevel {
    pub const CHAIN: [CascadeLevel; 6] = [
        CascadeLevel::Run,
        CascadeLevel::Paragraph,
        CascadeLevel::Shape,
        CascadeLevel::Layout,
        CascadeLevel::Master,
        CascadeLevel::Theme,
    ];
}

/// Order in which cascade levels are consulted. Always a permutation of
/// [`CascadeLevel::CHAIN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CascadeLevel>", into = "Vec<CascadeLevel>")]
pub struct CascadePolicy {
    order: Vec<CascadeLevel>,
}

impl Default for CascadePolicy {
    fn default() -> Self {
        Self {
            order: CascadeLevel::CHAIN.to_vec(),
        }
    }
}

impl CascadePolicy {
    pub fn new(order: Vec<CascadeLevel>) -> Result<Self> {
        Self::try_from(order).map_err(DeckError::InvalidSettings)
    }

    pub fn order(&self) -> &[CascadeLevel] {
        &self.order
    }

    /// First level, in policy order, for which `lookup` yields a value.
    pub fn pick<T>(&self, mut lookup: impl FnMut(CascadeLevel) -> Option<T>) -> Option<(T, CascadeLevel)> {
        self.order
            .iter()
            .find_map(|level| lookup(*level).map(|value| (value, *level)))
    }
}

impl TryFrom<Vec<CascadeLevel>> for CascadePolicy {
    type Error = String;

    fn try_from(order: Vec<CascadeLevel>) -> std::result::Result<Self, Self::Error> {
        if order.contains(&CascadeLevel::HardDefault) {
            return Err("hardDefault is not a cascade level".to_string());
        }
        if order.len() != CascadeLevel::CHAIN.len() {
            return Err(format!(
                "cascade policy must list {} levels, got {}",
                CascadeLevel::CHAIN.len(),
                order.len()
            ));
        }
        if let Some(missing) = CascadeLevel::CHAIN.iter().find(|l| !order.contains(l)) {
            return Err(format!("cascade policy is missing level {:?}", missing));
        }
        Ok(Self { order })
    }
}

impl From<CascadePolicy> for Vec<CascadeLevel> {
    fn from(policy: CascadePolicy) -> Self {
        policy.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_the_chain() {
        assert_eq!(CascadePolicy::default().order(), &CascadeLevel::CHAIN);
    }

    #[test]
    fn policy_must_be_a_permutation() {
        use CascadeLevel::*;
        assert!(CascadePolicy::new(vec![Theme, Master, Layout, Shape, Paragraph, Run]).is_ok());
        assert!(CascadePolicy::new(vec![Run, Run, Shape, Layout, Master, Theme]).is_err());
        assert!(CascadePolicy::new(vec![Run, Paragraph]).is_err());
        assert!(CascadePolicy::new(vec![Run, Paragraph, Shape, Layout, Master, HardDefault]).is_err());
    }

    #[test]
    fn pick_returns_first_defining_level() {
        let policy = CascadePolicy::default();
        let picked = policy.pick(|level| match level {
            CascadeLevel::Layout => Some(24.0),
            CascadeLevel::Theme => Some(18.0),
            _ => None,
        });
        assert_eq!(picked, Some((24.0, CascadeLevel::Layout)));
    }

    #[test]
    fn policy_serializes_as_list() {
        let json = serde_json::to_string(&CascadePolicy::default()).unwrap();
        assert_eq!(
            json,
            r#"["run","paragraph","shape","layout","master","theme"]"#
        );
        let err = serde_json::from_str::<CascadePolicy>(r#"["run"]"#);
        assert!(err.is_err());
    }
}
