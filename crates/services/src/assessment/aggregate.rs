//! Pure aggregation over the recorded per-question evaluations.

use linguaflow_config::LevelCutoffs;

use super::session::{DeterminedLevel, SessionQuestion, SkillScores};

pub struct Aggregate {
    pub determined_level: DeterminedLevel,
    pub level_confidence: f64,
    pub overall_score: f64,
    pub skill_scores: SkillScores,
    pub answered_count: usize,
    pub skipped_count: usize,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub detailed_feedback: String,
}

/// How far a skill mean must sit from the overall score before it is
/// called out as a strength or an improvement area.
const SKILL_MARGIN: f64 = 5.0;

/// Scatter scale for the confidence damping term: one standard deviation
/// of this many points halves the consistency factor.
const SCATTER_SCALE: f64 = 25.0;

pub fn aggregate(questions: &[SessionQuestion], cutoffs: &LevelCutoffs) -> Aggregate {
    let skipped_count = questions.iter().filter(|q| q.is_skipped).count();
    let answered: Vec<_> = questions
        .iter()
        .filter(|q| !q.is_skipped)
        .filter_map(|q| q.evaluation.as_ref())
        .collect();

    if answered.is_empty() {
        return Aggregate {
            determined_level: DeterminedLevel::InsufficientData,
            level_confidence: 0.0,
            overall_score: 0.0,
            skill_scores: SkillScores {
                accuracy: 0.0,
                pronunciation: 0.0,
                fluency: 0.0,
                grammar: 0.0,
            },
            answered_count: 0,
            skipped_count,
            key_strengths: Vec::new(),
            improvement_areas: Vec::new(),
            detailed_feedback: "No questions were answered, so no level could be determined. \
                                Retake the assessment and answer at least one question."
                .to_string(),
        };
    }

    let n = answered.len() as f64;
    let skill_scores = SkillScores {
        accuracy: answered.iter().map(|e| e.accuracy).sum::<f64>() / n,
        pronunciation: answered.iter().map(|e| e.pronunciation).sum::<f64>() / n,
        fluency: answered.iter().map(|e| e.fluency).sum::<f64>() / n,
        grammar: answered.iter().map(|e| e.grammar).sum::<f64>() / n,
    };

    let per_question: Vec<f64> = answered.iter().map(|e| e.overall()).collect();
    let overall_score = per_question.iter().sum::<f64>() / n;

    let determined_level = level_for(overall_score, cutoffs);
    let level_confidence = confidence(&per_question, questions.len());

    let (key_strengths, improvement_areas) = skill_split(&skill_scores, overall_score);
    let detailed_feedback = feedback_text(questions, overall_score, answered.len());

    Aggregate {
        determined_level,
        level_confidence,
        overall_score,
        skill_scores,
        answered_count: answered.len(),
        skipped_count,
        key_strengths,
        improvement_areas,
        detailed_feedback,
    }
}

/// Monotonic score-to-band mapping. A score must strictly exceed a cutoff
/// to reach the band above it, so ties resolve to the lower band.
fn level_for(overall: f64, cutoffs: &LevelCutoffs) -> DeterminedLevel {
    if overall > cutoffs.c2 {
        DeterminedLevel::C2
    } else if overall > cutoffs.c1 {
        DeterminedLevel::C1
    } else if overall > cutoffs.b2 {
        DeterminedLevel::B2
    } else if overall > cutoffs.b1 {
        DeterminedLevel::B1
    } else if overall > cutoffs.a2 {
        DeterminedLevel::A2
    } else {
        DeterminedLevel::A1
    }
}

/// Answered ratio damped by score scatter: skipping questions and
/// answering inconsistently both lower confidence.
fn confidence(per_question: &[f64], total_questions: usize) -> f64 {
    let n = per_question.len() as f64;
    let answered_ratio = n / total_questions.max(1) as f64;

    let mean = per_question.iter().sum::<f64>() / n;
    let variance = per_question.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let consistency = 1.0 / (1.0 + variance.sqrt() / SCATTER_SCALE);

    (answered_ratio * consistency).clamp(0.0, 1.0)
}

fn skill_split(skills: &SkillScores, overall: f64) -> (Vec<String>, Vec<String>) {
    let named = [
        ("accuracy", skills.accuracy),
        ("pronunciation", skills.pronunciation),
        ("fluency", skills.fluency),
        ("grammar", skills.grammar),
    ];

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (name, score) in named {
        if score >= overall + SKILL_MARGIN {
            strengths.push(name.to_string());
        } else if score <= overall - SKILL_MARGIN {
            weaknesses.push(name.to_string());
        }
    }
    (strengths, weaknesses)
}

fn feedback_text(questions: &[SessionQuestion], overall: f64, answered: usize) -> String {
    let mut lines = vec![format!(
        "Answered {answered} of {} questions with an overall score of {overall:.1}.",
        questions.len()
    )];
    for q in questions {
        if q.is_skipped {
            lines.push(format!("Question {}: skipped.", q.question.number));
        } else if let Some(eval) = &q.evaluation {
            lines.push(format!("Question {}: {}", q.question.number, eval.feedback));
        }
    }
    lines.join("\n")
}
