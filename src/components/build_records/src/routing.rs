use ast::Annotation;
use attributes::{AttributeTarget, TargetSet};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::Display;

/// Attribute names per sub-declaration of one positional parameter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutedAttributes {
    pub field: Vec<String>,
    pub property: Vec<String>,
    pub param: Vec<String>,
    pub method: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    InvalidLocation { keyword: String, valid: TargetSet },
    NotValidOn,
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::InvalidLocation { keyword, valid } => write!(
                f,
                "'{}' is not a valid attribute location for this declaration, valid locations are '{}'",
                keyword,
                valid.iter().map(|target| target.keyword()).join(", ")
            ),
            DropReason::NotValidOn => {
                write!(f, "attribute is not valid on this declaration type")
            }
        }
    }
}

/// Routes annotations written on a positional parameter to the backing
/// field, property, constructor parameter or getter they apply to
pub struct AttributeRouter<'r> {
    attribute_classes: &'r IndexMap<String, TargetSet>,
    available: TargetSet,
    routed: RoutedAttributes,
}

impl<'r> AttributeRouter<'r> {
    pub fn new(attribute_classes: &'r IndexMap<String, TargetSet>, property_synthesized: bool) -> Self {
        Self {
            attribute_classes,
            available: if property_synthesized {
                TargetSet::ALL
            } else {
                TargetSet::only(AttributeTarget::Param)
            },
            routed: RoutedAttributes::default(),
        }
    }

    pub fn route(&mut self, annotation: &Annotation) -> Result<TargetSet, DropReason> {
        let requested = match annotation.target.as_deref() {
            None => TargetSet::UNPREFIXED.intersect(self.available),
            Some(keyword) => match AttributeTarget::from_keyword(keyword) {
                Some(target) if self.available.contains(target) => TargetSet::only(target),
                _ => {
                    return Err(DropReason::InvalidLocation {
                        keyword: keyword.into(),
                        valid: self.available,
                    });
                }
            },
        };

        let allowed = self
            .attribute_classes
            .get(&annotation.name)
            .copied()
            .unwrap_or(TargetSet::ALL);

        let targets = requested.intersect(allowed);

        if targets.is_empty() {
            return Err(DropReason::NotValidOn);
        }

        for target in targets.iter() {
            let list = match target {
                AttributeTarget::Field => &mut self.routed.field,
                AttributeTarget::Property => &mut self.routed.property,
                AttributeTarget::Param => &mut self.routed.param,
                AttributeTarget::Method => &mut self.routed.method,
            };

            list.push(annotation.name.clone());
        }

        Ok(targets)
    }

    pub fn finish(self) -> RoutedAttributes {
        self.routed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unprefixed_goes_to_field_property_and_param() {
        let classes = IndexMap::new();
        let mut router = AttributeRouter::new(&classes, true);

        router.route(&Annotation::new("Required")).unwrap();
        router
            .route(&Annotation::targeted("method", "Pure"))
            .unwrap();

        assert_eq!(
            router.finish(),
            RoutedAttributes {
                field: vec!["Required".into()],
                property: vec!["Required".into()],
                param: vec!["Required".into()],
                method: vec!["Pure".into()],
            }
        );
    }

    #[test]
    fn test_unknown_and_unavailable_locations_are_dropped() {
        let classes = IndexMap::new();
        let mut router = AttributeRouter::new(&classes, false);

        assert_eq!(
            router.route(&Annotation::targeted("return", "A")),
            Err(DropReason::InvalidLocation {
                keyword: "return".into(),
                valid: TargetSet::only(AttributeTarget::Param),
            })
        );
        assert!(router.route(&Annotation::targeted("property", "B")).is_err());
        assert_eq!(
            router.route(&Annotation::new("C")),
            Ok(TargetSet::only(AttributeTarget::Param))
        );
    }

    #[test]
    fn test_attribute_usage_narrows_targets() {
        let mut classes = IndexMap::new();
        classes.insert("PropertyOnly".to_string(), TargetSet::only(AttributeTarget::Property));
        classes.insert("MethodOnly".to_string(), TargetSet::only(AttributeTarget::Method));

        let mut router = AttributeRouter::new(&classes, true);

        assert_eq!(
            router.route(&Annotation::new("PropertyOnly")),
            Ok(TargetSet::only(AttributeTarget::Property))
        );
        assert_eq!(
            router.route(&Annotation::new("MethodOnly")),
            Err(DropReason::NotValidOn)
        );
    }
}
