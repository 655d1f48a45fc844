use std::collections::VecDeque;

use mcc_map::{
    AliasDictionary, CompletenessEngine, InteractiveConfig, MatchMethod, MatchMethodConfig,
    OperatorDecision, OperatorResolver, RankedCandidate, RankingMethod,
};
use mcc_model::MatchKind;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn imaging_aliases() -> AliasDictionary {
    let mut dictionary = AliasDictionary::new();
    dictionary.insert("PatientID", strings(&["patient_id"]));
    dictionary.insert("Modality", strings(&["modality"]));
    dictionary
}

/// Answers from a queue and records what it was shown.
struct ScriptedResolver {
    answers: VecDeque<Answer>,
    asked: Vec<(String, Vec<String>)>,
    messages: Vec<String>,
}

enum Answer {
    Pick(&'static str),
    Skip,
    Stop,
    Typed(&'static str),
}

impl ScriptedResolver {
    fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl OperatorResolver for ScriptedResolver {
    fn decide(&mut self, field: &str, candidates: &[RankedCandidate]) -> OperatorDecision {
        self.asked.push((
            field.to_string(),
            candidates.iter().map(|c| c.header.clone()).collect(),
        ));
        match self.answers.pop_front() {
            Some(Answer::Pick(header)) => candidates
                .iter()
                .position(|c| c.header == header)
                .map_or(OperatorDecision::Skip, OperatorDecision::Select),
            Some(Answer::Skip) | None => OperatorDecision::Skip,
            Some(Answer::Stop) => OperatorDecision::Stop,
            Some(Answer::Typed(input)) => mcc_map::parse_decision(input, candidates.len()),
        }
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn interactive_config(limit: usize) -> MatchMethodConfig {
    MatchMethodConfig::default()
        .with_alias_dictionary(&imaging_aliases())
        .with_interactive(InteractiveConfig {
            enabled: true,
            ranking: RankingMethod::Fuzzy,
            limit,
        })
}

#[test]
fn end_to_end_alias_example() {
    let engine =
        CompletenessEngine::new(MatchMethodConfig::default().with_alias_dictionary(&imaging_aliases()));
    let headers = strings(&["Patient_ID", "modality", "StudyDate"]);
    let required = strings(&["PatientID", "Modality"]);

    let report = engine.check(&headers, &required);

    assert_eq!(
        report.mapping.pairs(),
        vec![("PatientID", "Patient_ID"), ("Modality", "modality")]
    );
    assert!(report.missing_headers.is_empty());
    assert_eq!(report.unexpected_headers, vec!["StudyDate"]);
    assert_eq!(report.completeness_score, 1.0);
}

#[test]
fn missing_field_halves_the_score() {
    let engine =
        CompletenessEngine::new(MatchMethodConfig::default().with_alias_dictionary(&imaging_aliases()));
    let report = engine.check(&strings(&["Patient_ID"]), &strings(&["PatientID", "Sex"]));

    assert_eq!(report.mapping.pairs(), vec![("PatientID", "Patient_ID")]);
    assert_eq!(report.missing_headers, vec!["Sex"]);
    assert!(report.unexpected_headers.is_empty());
    assert_eq!(report.completeness_score, 0.5);
}

#[test]
fn zero_required_fields_scores_zero() {
    let engine = CompletenessEngine::new(MatchMethodConfig::default());
    let report = engine.check(&strings(&["A", "B"]), &[]);
    assert_eq!(report.completeness_score, 0.0);
    assert!(report.mapping.is_empty());
    assert_eq!(report.unexpected_headers, vec!["A", "B"]);
}

#[test]
fn earlier_strategy_wins() {
    let headers = strings(&["patient_age_years", "Agee"]);
    let required = strings(&["Age"]);
    let fuzzy = MatchMethod::Fuzzy { threshold: 80.0 };

    let substring_first = CompletenessEngine::new(MatchMethodConfig::from_methods([
        MatchMethod::NormalizedSubstring,
        fuzzy.clone(),
    ]));
    let fuzzy_first = CompletenessEngine::new(MatchMethodConfig::from_methods([
        fuzzy,
        MatchMethod::NormalizedSubstring,
    ]));

    let report = substring_first.check(&headers, &required);
    assert_eq!(report.mapping.get("Age"), Some("patient_age_years"));
    assert_eq!(
        report.mapping.entry("Age").map(|entry| entry.kind),
        Some(MatchKind::NormalizedSubstring)
    );
    assert_eq!(report.unexpected_headers, vec!["Agee"]);

    let report = fuzzy_first.check(&headers, &required);
    assert_eq!(report.mapping.get("Age"), Some("Agee"));
    assert_eq!(
        report.mapping.entry("Age").map(|entry| entry.kind),
        Some(MatchKind::Fuzzy)
    );
}

#[test]
fn disabled_strategies_are_ignored() {
    let mut config = MatchMethodConfig::from_methods([MatchMethod::Exact]);
    config.methods[0].enabled = false;
    let engine = CompletenessEngine::new(config);
    let report = engine.check(&strings(&["Age"]), &strings(&["Age"]));
    assert!(report.mapping.is_empty());
    assert_eq!(report.missing_headers, vec!["Age"]);
}

#[test]
fn one_header_may_serve_two_fields() {
    let engine = CompletenessEngine::new(MatchMethodConfig::from_methods([
        MatchMethod::NormalizedSubstring,
    ]));
    let report = engine.check(&strings(&["study date"]), &strings(&["Study", "Date"]));
    assert_eq!(report.mapping.get("Study"), Some("study date"));
    assert_eq!(report.mapping.get("Date"), Some("study date"));
    assert!(report.unexpected_headers.is_empty());
    assert_eq!(report.completeness_score, 1.0);
}

#[test]
fn repeated_runs_are_identical() {
    let engine = CompletenessEngine::new(
        MatchMethodConfig::from_methods([
            MatchMethod::Exact,
            MatchMethod::AliasDictionary { dictionary: None },
            MatchMethod::NormalizedSubstring,
            MatchMethod::Fuzzy { threshold: 70.0 },
        ])
        .with_alias_dictionary(&imaging_aliases()),
    );
    let headers = strings(&["Patient_ID", "Modalty", "BodyPart", "StudyDate"]);
    let required = strings(&["PatientID", "Modality", "Body Part", "Sex"]);

    let first = engine.check(&headers, &required);
    let second = engine.check(&headers, &required);
    assert_eq!(first, second);
}

#[test]
fn operator_sees_only_unmatched_headers_and_missing_fields() {
    let engine = CompletenessEngine::new(interactive_config(3));
    let headers = strings(&["Patient_ID", "gender", "modality_code", "StudyDate"]);
    let required = strings(&["PatientID", "Sex", "Modality"]);
    let mut resolver = ScriptedResolver::new(vec![Answer::Pick("gender"), Answer::Skip]);

    let report = engine.check_with_operator(&headers, &required, &mut resolver);

    let asked_fields: Vec<&str> = resolver.asked.iter().map(|(f, _)| f.as_str()).collect();
    assert_eq!(asked_fields, vec!["Sex", "Modality"]);
    for (_, candidates) in &resolver.asked {
        assert!(!candidates.contains(&"Patient_ID".to_string()));
        assert_eq!(candidates.len(), 3);
    }
    assert_eq!(report.mapping.get("Sex"), Some("gender"));
    assert_eq!(
        report.mapping.entry("Sex").map(|entry| entry.kind),
        Some(MatchKind::Ranked)
    );
    assert!(!report.mapping.contains_field("Modality"));
    assert_eq!(report.missing_headers, vec!["Modality"]);
    assert_eq!(report.unexpected_headers, vec!["modality_code", "StudyDate"]);
}

#[test]
fn operator_stop_keeps_accepted_mappings() {
    let engine = CompletenessEngine::new(interactive_config(4));
    let headers = strings(&["Patient_ID", "gender", "StudyDate"]);
    let required = strings(&["PatientID", "Sex", "Age"]);
    let mut resolver = ScriptedResolver::new(vec![Answer::Stop, Answer::Pick("StudyDate")]);

    let report = engine.check_with_operator(&headers, &required, &mut resolver);

    assert_eq!(resolver.asked.len(), 1);
    assert_eq!(report.mapping.pairs(), vec![("PatientID", "Patient_ID")]);
    assert_eq!(report.missing_headers, vec!["Sex", "Age"]);
    assert!(
        resolver
            .messages
            .iter()
            .any(|message| message == "Stopping completeness check")
    );
}

#[test]
fn unrecognized_input_skips_and_continues() {
    let engine = CompletenessEngine::new(interactive_config(4));
    let headers = strings(&["gender", "years"]);
    let required = strings(&["Sex", "Age"]);
    let mut resolver = ScriptedResolver::new(vec![Answer::Typed("maybe"), Answer::Typed("1")]);

    let report = engine.check_with_operator(&headers, &required, &mut resolver);

    assert_eq!(resolver.asked.len(), 2);
    assert!(!report.mapping.contains_field("Sex"));
    assert!(report.mapping.contains_field("Age"));
    assert_eq!(report.completeness_score, 0.5);
    assert!(
        resolver
            .messages
            .iter()
            .any(|message| message == "Input not recognized - skipping field: Sex")
    );
}

#[test]
fn interactive_disabled_never_asks() {
    let engine =
        CompletenessEngine::new(MatchMethodConfig::default().with_alias_dictionary(&imaging_aliases()));
    let mut resolver = ScriptedResolver::new(vec![Answer::Pick("gender")]);
    let report =
        engine.check_with_operator(&strings(&["gender"]), &strings(&["Sex"]), &mut resolver);
    assert!(resolver.asked.is_empty());
    assert_eq!(report.missing_headers, vec!["Sex"]);
}

#[test]
fn check_without_operator_skips_interactive_pass() {
    let engine = CompletenessEngine::new(interactive_config(4));
    let report = engine.check(&strings(&["gender"]), &strings(&["Sex"]));
    assert!(report.mapping.is_empty());
}

#[test]
fn embedding_ranking_without_model_falls_back() {
    let config = interactive_config(4).with_interactive(InteractiveConfig {
        enabled: true,
        ranking: RankingMethod::Embedding,
        limit: 4,
    });
    let engine = CompletenessEngine::with_configured_ranking(config, None);
    assert_eq!(engine.ranking_provider().name(), "fuzzy");
}
