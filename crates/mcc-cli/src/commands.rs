use std::io;

use anyhow::Result;

use mcc_cli::config::MatchOverrides;
use mcc_cli::pipeline::{CheckOutcome, CheckRequest, list_fields, run_check as run_pipeline};
use mcc_cli::prompt::TerminalResolver;
use mcc_model::RequiredField;

use crate::cli::{CheckArgs, FieldsArgs};

pub fn run_check(args: &CheckArgs) -> Result<CheckOutcome> {
    let request = CheckRequest {
        data: args.data.clone(),
        reference: args.reference.clone(),
        level: args.level.clone(),
        separator: args.separator,
        config: args.config.clone(),
        overrides: MatchOverrides {
            methods: args.methods.clone(),
            fuzzy_threshold: args.fuzzy_threshold,
            interactive: args.interactive,
            ranking: args.ranking.map(Into::into),
            limit: args.limit,
            embedding_model: args.embedding_model.clone(),
        },
        plot: args.plot,
        output_dir: args.output_dir.clone(),
        json: args.json.clone(),
    };
    let mut operator = TerminalResolver::new(io::stdin().lock(), io::stdout());
    run_pipeline(&request, &mut operator)
}

pub fn run_fields(args: &FieldsArgs) -> Result<Vec<RequiredField>> {
    list_fields(&args.reference, args.level.as_deref())
}
