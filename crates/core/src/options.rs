//! Enumerated answer options shared by every layer.
//!
//! Each option set is declared exactly once here. The same enum is used to
//! validate submissions, to persist answers (serialized by label), to render
//! prompts, and to publish the option catalog to the client.

use std::fmt;

use serde::Serialize;

/// An enum whose variants map one-to-one onto fixed display labels.
pub trait Labeled: Sized + Copy + 'static {
    /// Every variant, in presentation order.
    const ALL: &'static [Self];

    /// Field-level name used in error messages.
    const KIND: &'static str;

    /// The display label persisted and sent over the wire.
    fn label(self) -> &'static str;

    /// Parse an exact label.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }

    /// All labels, in presentation order.
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.label()).collect()
    }
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Labeled for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const KIND: &'static str = $kind;

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_label(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown {} '{raw}'", $kind))
                })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Step 1: personal foundation
// ---------------------------------------------------------------------------

labeled_enum! {
    JobStatus, "job status" {
        Student => "Student",
        FullTimeEmployee => "Full-time Employee",
        PartTimeEmployee => "Part-time Employee",
        Freelancer => "Freelancer",
        Entrepreneur => "Entrepreneur with Existing Business",
        BetweenJobs => "Between Jobs",
        Retired => "Retired",
    }
}

labeled_enum! {
    Industry, "industry" {
        CoachingConsulting => "Coaching & Consulting",
        MarketingAdvertising => "Marketing & Advertising",
        TechnologyIt => "Technology & IT",
        HealthWellness => "Health & Wellness",
        EducationTraining => "Education & Training",
        EcommerceRetail => "E-commerce & Retail",
        FinanceInvestment => "Finance & Investment",
        RealEstate => "Real Estate",
        DesignCreative => "Design & Creative",
        ContentCreation => "Content Creation",
        ProjectManagement => "Project Management",
        HumanResources => "Human Resources",
        Sales => "Sales",
        Hospitality => "Hospitality",
        TradesCrafts => "Trades & Crafts",
        Other => "Other",
        LetAiDecide => "Let AI Decide ✨",
    }
}

labeled_enum! {
    ExperienceLevel, "experience level" {
        UnderTwo => "Less than 2 years",
        TwoToFive => "2-5 years",
        FiveToTen => "5-10 years",
        TenToFifteen => "10-15 years",
        OverFifteen => "Over 15 years",
    }
}

labeled_enum! {
    EducationBackground, "education background" {
        SelfTaught => "Self-taught/Career Changer",
        Vocational => "Vocational Training",
        Bachelor => "Bachelor's Degree",
        Master => "Master's Degree",
        Doctorate => "PhD/Doctorate",
        MultipleDegrees => "Multiple Degrees",
    }
}

labeled_enum! {
    GeographicLocation, "geographic location" {
        NorthAmerica => "North America",
        Europe => "Europe",
        AsiaPacific => "Asia-Pacific",
        LatinAmerica => "Latin America",
        MiddleEastAfrica => "Middle East & Africa",
        Other => "Other",
    }
}

labeled_enum! {
    CityMarketSize, "city market size" {
        Metropolitan => "Major Metropolitan (1M+)",
        MidSize => "Mid-size City (100K-1M)",
        SmallCity => "Small City (10K-100K)",
        Rural => "Rural/Small Town (<10K)",
    }
}

labeled_enum! {
    TimeAvailability, "time availability" {
        UnderFive => "Less than 5 hours",
        FiveToTen => "5-10 hours",
        TenToTwenty => "10-20 hours",
        TwentyToThirty => "20-30 hours",
        OverThirty => "More than 30 hours per week",
    }
}

labeled_enum! {
    BudgetRange, "budget range" {
        Under50 => "Under $50",
        From50To150 => "$50-150",
        From150To500 => "$150-500",
        From500To1000 => "$500-1000",
        Over1000 => "Over $1000 monthly",
    }
}

labeled_enum! {
    TechComfort, "tech comfort" {
        EarlyAdopter => "Early Adopter - I try everything new",
        Enthusiast => "Tech Enthusiast - I learn eagerly",
        CautiousButOpen => "Cautious but Open - I need proven results",
        Traditional => "Traditional - I prefer established methods",
    }
}

labeled_enum! {
    SupportSystem, "support system" {
        Alone => "Working completely alone",
        FamilyFriends => "Family/Friends support me",
        Mentors => "I have mentors or coaches",
        Community => "I'm part of a community",
        SmallTeam => "I have a small team",
    }
}

labeled_enum! {
    CoreSkill, "core skill" {
        SubjectMatterExpertise => "Subject Matter Expertise",
        Communication => "Communication & Presentation",
        ProblemSolving => "Problem Solving & Analysis",
        StrategicThinking => "Strategic Thinking",
        Creativity => "Creativity & Innovation",
        Technical => "Technical Understanding",
        ProjectManagement => "Project Management",
        SalesBusinessDevelopment => "Sales & Business Development",
        Leadership => "Leadership & Team Management",
        Empathy => "Empathy & People Skills",
    }
}

labeled_enum! {
    FocusArea, "focus area" {
        PersonalDevelopment => "Personal Development",
        Business => "Business & Entrepreneurship",
        MarketingSales => "Marketing & Sales",
        Technology => "Technology & Innovation",
        HealthLifestyle => "Health & Lifestyle",
        Education => "Education & Knowledge",
        CreativityDesign => "Creativity & Design",
        Sustainability => "Sustainability & Environment",
        Finance => "Finance & Investment",
        Leadership => "Leadership & Management",
        Other => "Other",
    }
}

labeled_enum! {
    PrimaryGoal, "primary goal" {
        HelpOthers => "Help others succeed",
        ExpertRecognition => "Be recognized as an expert",
        CareerOpportunities => "Create new career opportunities",
        SideIncome => "Build side income ($500-2000/month)",
        SelfEmployed => "Become fully self-employed",
        ScaleBusiness => "Scale existing business",
        FinancialIndependence => "Achieve financial independence",
    }
}

labeled_enum! {
    Timeline, "timeline" {
        ThreeMonths => "Within 3 months",
        SixMonths => "Within 6 months",
        TwelveMonths => "Within 12 months",
        LongTerm => "I'm building long-term (2+ years)",
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

labeled_enum! {
    /// Which generated artifact (or report section) a rating scores.
    RatingType, "rating type" {
        Step1Result => "step1_result",
        Step2Result => "step2_result",
        FinalResult => "final_result",
        BrandPosition => "brand_position",
        StrengthsMatrix => "strengths_matrix",
        HeroSlogans => "hero_slogans",
        Differentiators => "differentiators",
        BrandVoice => "brand_voice",
        ClientAvatar => "client_avatar",
        MarketAnalysis => "market_analysis",
        CompetitiveMapping => "competitive_mapping",
        LaunchRoadmap => "launch_roadmap",
        PremiumServices => "premium_services",
        BusinessModel => "business_model",
    }
}

labeled_enum! {
    ConfidenceLevel, "confidence level" {
        VeryConfident => "Very confident - I can implement immediately",
        Confident => "Confident - I understand the strategy",
        SomewhatConfident => "Somewhat confident - I need more guidance",
        NotConfident => "Not confident - This feels overwhelming",
        Uncertain => "Uncertain - I need professional help",
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Inclusive bounds for a counted or length-limited field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: u64,
    pub max: u64,
}

pub const CORE_SKILLS_BOUNDS: Bounds = Bounds { min: 3, max: 5 };
pub const PRIMARY_GOALS_BOUNDS: Bounds = Bounds { min: 2, max: 3 };

/// Every option list keyed by its camelCase field name, plus the bounds the
/// client needs to mirror server-side validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCatalog {
    pub job_status: Vec<&'static str>,
    pub industry_preference: Vec<&'static str>,
    pub experience_level: Vec<&'static str>,
    pub education_background: Vec<&'static str>,
    pub geographic_location: Vec<&'static str>,
    pub city_market_size: Vec<&'static str>,
    pub time_availability: Vec<&'static str>,
    pub budget_range: Vec<&'static str>,
    pub tech_comfort: Vec<&'static str>,
    pub support_system: Vec<&'static str>,
    pub core_skills: Vec<&'static str>,
    pub focus_area: Vec<&'static str>,
    pub primary_goals: Vec<&'static str>,
    pub timeline: Vec<&'static str>,
    pub rating_type: Vec<&'static str>,
    pub confidence_level: Vec<&'static str>,
    pub core_skills_count: Bounds,
    pub primary_goals_count: Bounds,
}

/// Build the full option catalog.
pub fn catalog() -> OptionCatalog {
    OptionCatalog {
        job_status: JobStatus::labels(),
        industry_preference: Industry::labels(),
        experience_level: ExperienceLevel::labels(),
        education_background: EducationBackground::labels(),
        geographic_location: GeographicLocation::labels(),
        city_market_size: CityMarketSize::labels(),
        time_availability: TimeAvailability::labels(),
        budget_range: BudgetRange::labels(),
        tech_comfort: TechComfort::labels(),
        support_system: SupportSystem::labels(),
        core_skills: CoreSkill::labels(),
        focus_area: FocusArea::labels(),
        primary_goals: PrimaryGoal::labels(),
        timeline: Timeline::labels(),
        rating_type: RatingType::labels(),
        confidence_level: ConfidenceLevel::labels(),
        core_skills_count: CORE_SKILLS_BOUNDS,
        primary_goals_count: PRIMARY_GOALS_BOUNDS,
    }
}
