//! Validated resource-model ladders.
//!
//! A [`GradeScheme`] is built once per pass from a cluster's resource
//! models. Construction sorts the grades, checks every invariant of the
//! ladder, and indexes the ranges per dimension so that classification is
//! a straight scan. A scheme that constructs successfully can classify any
//! non-negative quantity of any of its dimensions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use kubellm_cluster_api::{Quantity, ResourceModel, ResourceModelRange, ResourceName};
use tracing::debug;

use crate::config::GapPolicy;
use crate::defaults::default_resource_models;
use crate::error::{GradingError, GradingResult};

/// One dimension's interval within one grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rung {
    min: Quantity,
    max: Quantity,
}

impl From<&ResourceModelRange> for Rung {
    fn from(range: &ResourceModelRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

/// Where a quantity landed on one dimension's ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMatch {
    /// Position in the ladder (0 = lowest grade).
    pub index: usize,
    /// The quantity fell between two rungs and was assigned to the lower one.
    pub in_gap: bool,
}

/// A validated, ascending resource-model ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeScheme {
    models: Vec<ResourceModel>,
    ladders: BTreeMap<ResourceName, Vec<Rung>>,
}

impl GradeScheme {
    /// Validate a user-supplied ladder.
    ///
    /// Grades may be given in any order and need not be consecutive. Every
    /// grade must declare a range for the same set of dimensions.
    pub fn new(mut models: Vec<ResourceModel>, gaps: GapPolicy) -> GradingResult<Self> {
        if models.is_empty() {
            return Err(GradingError::EmptyScheme);
        }
        models.sort_by_key(|m| m.grade);

        for pair in models.windows(2) {
            if pair[0].grade == pair[1].grade {
                return Err(GradingError::DuplicateGrade(pair[0].grade));
            }
        }

        for model in &models {
            if model.ranges.is_empty() {
                return Err(GradingError::EmptyRanges { grade: model.grade });
            }
            let mut seen = BTreeSet::new();
            for range in &model.ranges {
                if !seen.insert(range.name.as_str()) {
                    return Err(GradingError::DuplicateRange {
                        grade: model.grade,
                        name: range.name.clone(),
                    });
                }
            }
        }

        let lowest = &models[0];
        for model in &models[1..] {
            for range in &lowest.ranges {
                if model.range(&range.name).is_none() {
                    return Err(GradingError::MissingRange {
                        grade: model.grade,
                        name: range.name.clone(),
                    });
                }
            }
            for range in &model.ranges {
                if lowest.range(&range.name).is_none() {
                    return Err(GradingError::MissingRange {
                        grade: lowest.grade,
                        name: range.name.clone(),
                    });
                }
            }
        }

        let scheme = Self::index(models);
        for (name, ladder) in &scheme.ladders {
            scheme.validate_ladder(name, ladder, gaps)?;
        }
        Ok(scheme)
    }

    /// The default 0–8 ladder.
    pub fn default_ladder() -> Self {
        Self::index(default_resource_models())
    }

    /// Use the cluster's own models when it declares any, the default
    /// ladder otherwise. An explicitly empty list is an error.
    pub fn resolve(models: Option<&[ResourceModel]>, gaps: GapPolicy) -> GradingResult<Self> {
        match models {
            Some(models) => Self::new(models.to_vec(), gaps),
            None => Ok(Self::default_ladder()),
        }
    }

    fn index(models: Vec<ResourceModel>) -> Self {
        let mut ladders: BTreeMap<ResourceName, Vec<Rung>> = BTreeMap::new();
        for model in &models {
            for range in &model.ranges {
                ladders
                    .entry(range.name.clone())
                    .or_default()
                    .push(Rung::from(range));
            }
        }
        Self { models, ladders }
    }

    fn validate_ladder(&self, name: &str, ladder: &[Rung], gaps: GapPolicy) -> GradingResult<()> {
        let last = ladder.len() - 1;
        for (index, rung) in ladder.iter().enumerate() {
            let grade = self.grade_at(index);
            let min = if index == 0 { Quantity::ZERO } else { rung.min };

            if index > 0 && rung.min.is_negative() {
                return Err(GradingError::NegativeBound {
                    grade,
                    name: name.to_string(),
                    min: rung.min,
                });
            }
            if index < last && rung.max <= min {
                return Err(GradingError::InvalidRange {
                    grade,
                    name: name.to_string(),
                    min,
                    max: rung.max,
                });
            }
            if index == 0 {
                continue;
            }

            let below = ladder[index - 1];
            let lower = self.grade_at(index - 1);
            match rung.min.cmp(&below.max) {
                Ordering::Equal => {}
                Ordering::Less => {
                    return Err(GradingError::Overlap {
                        name: name.to_string(),
                        lower,
                        upper: grade,
                        min: rung.min,
                        max: below.max,
                    });
                }
                Ordering::Greater => match gaps {
                    GapPolicy::Reject => {
                        return Err(GradingError::Gap {
                            name: name.to_string(),
                            lower,
                            upper: grade,
                            min: rung.min,
                            max: below.max,
                        });
                    }
                    GapPolicy::NearestLower => {
                        debug!(
                            resource = name,
                            lower,
                            upper = grade,
                            from = %below.max,
                            to = %rung.min,
                            "ladder gap accepted, values in it take the lower grade"
                        );
                    }
                },
            }
        }
        Ok(())
    }

    /// Locate a quantity on one dimension's ladder.
    ///
    /// Scans grades in ascending order. The lowest grade starts at zero
    /// whatever its declared min, and the highest grade has no upper bound.
    /// Returns `None` if the scheme does not grade this dimension.
    pub fn locate(&self, name: &str, quantity: Quantity) -> Option<DimensionMatch> {
        let ladder = self.ladders.get(name)?;
        let last = ladder.len().checked_sub(1)?;
        for (index, rung) in ladder.iter().enumerate() {
            let min = if index == 0 { Quantity::ZERO } else { rung.min };
            if quantity < min {
                // Past the previous rung's max but short of this one's min.
                return Some(DimensionMatch {
                    index: index.saturating_sub(1),
                    in_gap: true,
                });
            }
            if index == last || quantity < rung.max {
                return Some(DimensionMatch {
                    index,
                    in_gap: false,
                });
            }
        }
        None
    }

    /// Grade value at a ladder position.
    pub fn grade_at(&self, index: usize) -> u32 {
        self.models[index].grade
    }

    /// Grade values, ascending.
    pub fn grades(&self) -> impl Iterator<Item = u32> + '_ {
        self.models.iter().map(|m| m.grade)
    }

    /// The highest grade, whose ranges are unbounded above.
    pub fn terminal_grade(&self) -> u32 {
        self.grade_at(self.models.len() - 1)
    }

    /// Number of grades in the ladder. Never zero.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Dimension names graded by this scheme, sorted.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> + '_ {
        self.ladders.keys().map(String::as_str)
    }

    pub fn covers(&self, name: &str) -> bool {
        self.ladders.contains_key(name)
    }

    /// The ladder as resource models, ascending by grade.
    pub fn models(&self) -> &[ResourceModel] {
        &self.models
    }
}
