//! Domain tags, taxonomy labels, and the classifier between them.
//!
//! Known domain tags are a closed enum so that adding a tag forces a decision
//! in [`classify_tag`] and in every [`BonusGroup`]. Tags outside the enum are
//! not an error: they classify to [`Label::FALLBACK`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of taxonomy labels assigned to papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    TravelDesignRecovery,
    TravelDesignStrategy,
    TravelDesignExecution,
    TravelDesignEmergencyCommand,
    TravelDesignHumanProblemSolving,
    TravelDesignTechInnovation,
    TravelDesignJourneyOps,
    TravelDesignRevenue,
    TravelDesignResilience,
}

impl Label {
    /// Label for any domain tag outside the known set. Intentional policy.
    pub const FALLBACK: Label = Label::TravelDesignStrategy;

    pub fn as_str(self) -> &'static str {
        match self {
            Label::TravelDesignRecovery => "travel_design_recovery",
            Label::TravelDesignStrategy => "travel_design_strategy",
            Label::TravelDesignExecution => "travel_design_execution",
            Label::TravelDesignEmergencyCommand => "travel_design_emergency_command",
            Label::TravelDesignHumanProblemSolving => "travel_design_human_problem_solving",
            Label::TravelDesignTechInnovation => "travel_design_tech_innovation",
            Label::TravelDesignJourneyOps => "travel_design_journey_ops",
            Label::TravelDesignRevenue => "travel_design_revenue",
            Label::TravelDesignResilience => "travel_design_resilience",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! domain_tags {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// Domain tags with a known taxonomy mapping.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DomainTag {
            $($variant),+
        }

        impl DomainTag {
            pub const ALL: &'static [DomainTag] = &[$(DomainTag::$variant),+];

            /// Exact match on the lower-cased tag text.
            pub fn parse(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(DomainTag::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(DomainTag::$variant => $tag),+
                }
            }
        }
    };
}

domain_tags! {
    Wealth => "wealth",
    Travel => "travel",
    Mobility => "mobility",
    Operations => "operations",
    Novelty => "novelty",
    Exploration => "exploration",
    Reflection => "reflection",
    Safety => "safety",
    Resilience => "resilience",
    Recovery => "recovery",
    Health => "health",
    Wellbeing => "wellbeing",
    Neuroplasticity => "neuroplasticity",
    CognitiveAging => "cognitive-aging",
    BrainHealth => "brain-health",
    CognitiveReserve => "cognitive-reserve",
    Execution => "execution",
    Productivity => "productivity",
    Planning => "planning",
    DecisionQuality => "decision-quality",
    Motivation => "motivation",
    SkillBuilding => "skill-building",
    TeamOps => "team-ops",
    EmergencyResponse => "emergency-response",
    EmergencyPreparedness => "emergency-preparedness",
    EmergencyManagement => "emergency-management",
    CrisisManagement => "crisis-management",
    CrisisPlanning => "crisis-planning",
    IncidentCommand => "incident-command",
    HumanProblemSolving => "human-problem-solving",
    HumanPerformance => "human-performance",
    BiologicalPerformance => "biological-performance",
    EnvironmentalPerformance => "environmental-performance",
    ProblemSolving => "problem-solving",
    TechnologyInnovation => "technology-innovation",
    SystemsInnovation => "systems-innovation",
    DigitalInnovation => "digital-innovation",
    PhysicalInnovation => "physical-innovation",
    Innovation => "innovation",
}

/// Map a known tag to its label.
pub fn classify_tag(tag: DomainTag) -> Label {
    use DomainTag::*;
    match tag {
        Wealth => Label::TravelDesignRevenue,
        Travel | Mobility | Operations | Novelty | Exploration => Label::TravelDesignJourneyOps,
        Safety | Resilience => Label::TravelDesignResilience,
        Recovery | Health | Wellbeing | Neuroplasticity | CognitiveAging | BrainHealth
        | CognitiveReserve => Label::TravelDesignRecovery,
        Execution | Productivity => Label::TravelDesignExecution,
        Reflection | Planning | DecisionQuality | Motivation | SkillBuilding | TeamOps => {
            Label::TravelDesignStrategy
        }
        EmergencyResponse | EmergencyPreparedness | EmergencyManagement | CrisisManagement
        | CrisisPlanning | IncidentCommand => Label::TravelDesignEmergencyCommand,
        HumanProblemSolving | HumanPerformance | BiologicalPerformance
        | EnvironmentalPerformance | ProblemSolving => Label::TravelDesignHumanProblemSolving,
        TechnologyInnovation | SystemsInnovation | DigitalInnovation | PhysicalInnovation
        | Innovation => Label::TravelDesignTechInnovation,
    }
}

/// Classify a paper's domain text. Unknown tags get [`Label::FALLBACK`].
pub fn classify(domain: &str) -> Label {
    DomainTag::parse(domain).map_or(Label::FALLBACK, classify_tag)
}

/// Domain groups that earn one extra synthesized prompt each.
///
/// Membership is tested per group, so a tag in two groups earns two prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusGroup {
    Neuro,
    Emergency,
    HumanPerformance,
    Innovation,
}

impl BonusGroup {
    pub const ALL: [BonusGroup; 4] = [
        BonusGroup::Neuro,
        BonusGroup::Emergency,
        BonusGroup::HumanPerformance,
        BonusGroup::Innovation,
    ];

    pub fn contains(self, tag: DomainTag) -> bool {
        use DomainTag::*;
        match self {
            BonusGroup::Neuro => matches!(
                tag,
                Travel | Mobility | Recovery | Health | Wellbeing | SkillBuilding | Motivation
            ),
            BonusGroup::Emergency => matches!(
                tag,
                EmergencyResponse
                    | EmergencyPreparedness
                    | EmergencyManagement
                    | CrisisManagement
                    | CrisisPlanning
                    | IncidentCommand
            ),
            BonusGroup::HumanPerformance => matches!(
                tag,
                HumanProblemSolving
                    | HumanPerformance
                    | BiologicalPerformance
                    | EnvironmentalPerformance
                    | ProblemSolving
            ),
            BonusGroup::Innovation => matches!(
                tag,
                TechnologyInnovation
                    | SystemsInnovation
                    | DigitalInnovation
                    | PhysicalInnovation
                    | Innovation
            ),
        }
    }

    /// Fixed prompt text this group contributes.
    pub fn prompt(self) -> &'static str {
        match self {
            BonusGroup::Neuro => {
                "Travel design neuro brief: use controlled novelty plus structured reflection to improve adaptability and protect long-term cognitive vitality."
            }
            BonusGroup::Emergency => {
                "Emergency command brief: convert this evidence into a triage-stabilize-communicate-escalate protocol for immediate field execution."
            }
            BonusGroup::HumanPerformance => {
                "Human problem-solving optimization brief: define biological and environmental conditions that maximize cognitive throughput under uncertainty."
            }
            BonusGroup::Innovation => {
                "Innovation systems brief: translate this into a digital+physical prototype loop with safety gates and clear validation metrics."
            }
        }
    }

    /// Every group the raw domain text belongs to, in declaration order.
    pub fn matching(domain: &str) -> Vec<BonusGroup> {
        match DomainTag::parse(domain) {
            Some(tag) => Self::ALL.into_iter().filter(|g| g.contains(tag)).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_domain_falls_back_to_strategy() {
        assert_eq!(classify("unmapped-tag-xyz"), Label::TravelDesignStrategy);
        assert_eq!(classify(""), Label::FALLBACK);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert_eq!(classify("wealth"), Label::TravelDesignRevenue);
        assert_eq!(classify("Wealth"), Label::FALLBACK);
        assert_eq!(classify(" wealth"), Label::FALLBACK);
    }

    #[test]
    fn test_known_mappings() {
        assert_eq!(classify("crisis-management"), Label::TravelDesignEmergencyCommand);
        assert_eq!(classify("brain-health"), Label::TravelDesignRecovery);
        assert_eq!(classify("novelty"), Label::TravelDesignJourneyOps);
        assert_eq!(classify("productivity"), Label::TravelDesignExecution);
        assert_eq!(classify("safety"), Label::TravelDesignResilience);
        assert_eq!(classify("reflection"), Label::TravelDesignStrategy);
        assert_eq!(classify("problem-solving"), Label::TravelDesignHumanProblemSolving);
        assert_eq!(classify("innovation"), Label::TravelDesignTechInnovation);
    }

    #[test]
    fn test_tag_text_round_trips() {
        for tag in DomainTag::ALL {
            assert_eq!(DomainTag::parse(tag.as_str()), Some(*tag));
        }
    }

    #[test]
    fn test_label_serializes_as_snake_case() -> serde_json::Result<()> {
        let json = serde_json::to_string(&Label::TravelDesignEmergencyCommand)?;
        assert_eq!(json, "\"travel_design_emergency_command\"");
        assert_eq!(Label::TravelDesignJourneyOps.to_string(), "travel_design_journey_ops");
        Ok(())
    }

    #[test]
    fn test_bonus_groups_disjoint_for_known_tags() {
        for tag in DomainTag::ALL {
            let hits = BonusGroup::ALL.iter().filter(|g| g.contains(*tag)).count();
            assert!(hits <= 1, "{} in {} groups", tag.as_str(), hits);
        }
    }

    #[test]
    fn test_bonus_matching() {
        assert_eq!(BonusGroup::matching("crisis-management"), vec![BonusGroup::Emergency]);
        assert_eq!(BonusGroup::matching("travel"), vec![BonusGroup::Neuro]);
        assert!(BonusGroup::matching("wealth").is_empty());
        assert!(BonusGroup::matching("unmapped").is_empty());
    }
}
