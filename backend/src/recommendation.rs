//! Static guidance shown next to a prediction. Selection depends on the
//! label only, never on the probability.

use crate::inference::RiskLabel;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResourceLink {
    pub label: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RecommendationBundle {
    pub heading: &'static str,
    pub summary: &'static str,
    pub links: &'static [ResourceLink],
    pub closing: Option<&'static str>,
}

const MINDFULNESS_GUIDES: &str = "https://www.thisiscalmer.com/mindfulness-guides-and-ecourses";
const AWARENESS_VIDEO: &str = "https://youtu.be/YyjBKqsJqAo?si=Rnhnq2S_Xyuujmya";

pub static AT_RISK: RecommendationBundle = RecommendationBundle {
    heading: "Recommendations for At-Risk Individuals",
    summary: "If you are at risk of burnout, seek support from a mental health professional. \
              You may also find these helpful:",
    links: &[
        ResourceLink {
            label: "Mindfulness & Recovery Guides",
            url: MINDFULNESS_GUIDES,
        },
        ResourceLink {
            label: "Burnout Recovery Video",
            url: AWARENESS_VIDEO,
        },
        ResourceLink {
            label: "Healthline",
            url: "https://www.healthline.com/health/mental-health/burnout-recovery",
        },
        ResourceLink {
            label: "BetterHelp (Online Therapy)",
            url: "https://www.betterhelp.com/",
        },
    ],
    closing: Some("Book an appointment with your in-house psychologist or HR."),
};

pub static PREVENTIVE: RecommendationBundle = RecommendationBundle {
    heading: "Preventive Recommendations",
    summary: "You're not currently at risk. To maintain well-being:",
    links: &[
        ResourceLink {
            label: "Explore mindfulness tools",
            url: MINDFULNESS_GUIDES,
        },
        ResourceLink {
            label: "Learn to prevent burnout",
            url: "https://www.medicalnewstoday.com/articles/preventing-burnout",
        },
        ResourceLink {
            label: "Watch this awareness video",
            url: AWARENESS_VIDEO,
        },
    ],
    closing: None,
};

pub fn for_label(label: RiskLabel) -> &'static RecommendationBundle {
    match label {
        RiskLabel::AtRisk => &AT_RISK,
        RiskLabel::NotAtRisk => &PREVENTIVE,
    }
}
