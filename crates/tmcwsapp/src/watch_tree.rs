//! The whitelist of exercise folders that are expected to exist under the managed root.
//!
//! Three levels, `organization → course → exercise name`. A container exists only while it
//! has at least one child, so the reconciler can treat "known organization" and "known
//! course" as plain key lookups.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchTree {
    organizations: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl WatchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, organization: &str, course: &str, exercise: &str) {
        self.organizations
            .entry(organization.to_string())
            .or_default()
            .entry(course.to_string())
            .or_default()
            .insert(exercise.to_string());
    }

    /// Removes an exercise and prunes any course or organization left empty.
    ///
    /// Unwatching something that is not watched does nothing.
    pub fn unwatch(&mut self, organization: &str, course: &str, exercise: &str) {
        let Some(courses) = self.organizations.get_mut(organization) else {
            return;
        };
        if let Some(exercises) = courses.get_mut(course) {
            exercises.remove(exercise);
            if exercises.is_empty() {
                courses.remove(course);
            }
        }
        if courses.is_empty() {
            self.organizations.remove(organization);
        }
    }

    pub fn has_organization(&self, organization: &str) -> bool {
        self.organizations.contains_key(organization)
    }

    pub fn has_course(&self, organization: &str, course: &str) -> bool {
        self.organizations
            .get(organization)
            .is_some_and(|courses| courses.contains_key(course))
    }

    pub fn has_exercise(&self, organization: &str, course: &str, exercise: &str) -> bool {
        self.organizations
            .get(organization)
            .and_then(|courses| courses.get(course))
            .is_some_and(|exercises| exercises.contains(exercise))
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Watched `(organization, course, exercise)` triples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.organizations.iter().flat_map(|(org, courses)| {
            courses.iter().flat_map(move |(course, exercises)| {
                exercises
                    .iter()
                    .map(move |name| (org.as_str(), course.as_str(), name.as_str()))
            })
        })
    }
}
