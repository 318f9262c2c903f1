use std::io::Write;
use std::path::PathBuf;

use assessment_client::{
    cli::{list_filter, new_question, question_patch, Cli, Command},
    config::{get_config, init_config},
    dto::assessment_dto::NewAssessment,
    error::Result,
    models::{attempt::DisplayMode, subject::SUBJECTS},
    runner::{run_attempt, write_score},
    services::{
        assessment_store::AssessmentStore,
        attempt_counter::{attempt_key, AttemptCounterStore},
        authoring_service::{export_file_name, export_to_file},
    },
    session::{AssessmentSession, TokioScheduler},
    utils::validation::validate,
    AppContext,
};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    init_config()?;
    let config = get_config()?;
    let ctx = AppContext::new(config)?;
    info!(api = %config.api_base_url, "Assessment client ready");

    if let Err(e) = run(&ctx, cli.command).await {
        error!(error = %e, "Command failed");
        anyhow::bail!(e.user_message());
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    let mut out = std::io::stdout();
    match command {
        Command::List {
            subject,
            published,
            skip,
            limit,
        } => {
            let filter = list_filter(subject, published, skip, limit);
            for a in ctx.store.list_assessments(filter).await? {
                let status = if a.is_published { "published" } else { "draft" };
                writeln!(out, "{}\t{}\t{}\t{}", a.id, a.title, a.subject_label(), status)?;
            }
        }
        Command::Show { id } => {
            let assessment = ctx.store.get_assessment(&id).await?;
            let questions = ctx.store.list_questions(&id).await?;
            let used = ctx.counter.get(&attempt_key(&assessment.id))?;
            writeln!(out, "{} ({})", assessment.title, assessment.subject_label())?;
            if let Some(description) = &assessment.description {
                writeln!(out, "{}", description)?;
            }
            writeln!(
                out,
                "Time limit: {} min, attempts: {} used of {}, pass mark {}%, {}",
                display_opt(assessment.time_limit_minutes),
                used,
                display_opt(assessment.max_attempts),
                assessment.passing_score,
                if assessment.is_published { "published" } else { "draft" }
            )?;
            for (idx, q) in questions.iter().enumerate() {
                writeln!(out, "[{}] {} ({:?})", idx, q.question_text, q.kind.question_type())?;
                for option in q.kind.options() {
                    writeln!(out, "    - {}", option)?;
                }
                writeln!(out, "    answer: {}", q.correct_answer)?;
            }
        }
        Command::Take { id, all } => {
            let assessment = ctx.store.get_assessment(&id).await?;
            let questions = ctx.store.list_questions(&id).await?;
            let passing_score = assessment.passing_score;

            let (scheduler, mut timers) = TokioScheduler::new();
            let mut session = AssessmentSession::new(ctx.counter.clone(), scheduler);
            session.load(assessment, questions);
            if all {
                session.set_display_mode(DisplayMode::AllQuestions);
            }

            let outcome = session.start()?;
            writeln!(out, "{}", outcome.message())?;
            if !outcome.is_started() {
                return Ok(());
            }

            let input = BufReader::new(tokio::io::stdin());
            if let Some(score) = run_attempt(&mut session, &mut timers, input, &mut out).await? {
                write_score(&mut out, &score, passing_score)?;
            }
            if let Some(remaining) = session.attempts_remaining()? {
                writeln!(out, "Attempts remaining: {}", remaining)?;
            }
        }
        Command::Create {
            title,
            description,
            time_limit,
            max_attempts,
            passing_score,
        } => {
            let payload = NewAssessment {
                description,
                time_limit_minutes: time_limit,
                max_attempts,
                passing_score,
                ..NewAssessment::quiz(title)
            };
            validate(&payload)?;
            let created = ctx.store.create_assessment(payload).await?;
            writeln!(out, "Created {}", created.id)?;
        }
        Command::Delete { id } => {
            ctx.store.delete_assessment(&id).await?;
            writeln!(out, "Deleted {}", id)?;
        }
        Command::Export { id, file } => {
            let questions = ctx.store.list_questions(&id).await?;
            let path = file.unwrap_or_else(|| PathBuf::from(export_file_name(&id)));
            export_to_file(&questions, &path)?;
            writeln!(out, "Exported {} questions to {}", questions.len(), path.display())?;
        }
        Command::Import { id, file } => {
            let report = ctx.authoring.import_from_file(&id, &file).await?;
            writeln!(out, "Imported {} of {} questions", report.created, report.total)?;
            if let Some(failure) = report.failure {
                writeln!(
                    out,
                    "Stopped at question {}: {}",
                    failure.index + 1,
                    failure.message
                )?;
            }
        }
        Command::Publish { id, subject } => {
            let questions = ctx.store.list_questions(&id).await?;
            let published = ctx.authoring.publish(&id, &subject, &questions).await?;
            writeln!(out, "Published under {}", published.subject_label())?;
        }
        Command::Unpublish { id } => {
            ctx.authoring.unpublish(&id).await?;
            writeln!(out, "Unpublished {}", id)?;
        }
        Command::Settings {
            id,
            time_limit,
            max_attempts,
        } => {
            let updated = ctx
                .authoring
                .update_settings(&id, time_limit, max_attempts)
                .await?;
            writeln!(
                out,
                "Time limit: {} min, max attempts: {}",
                display_opt(updated.time_limit_minutes),
                display_opt(updated.max_attempts)
            )?;
        }
        Command::AddQuestion {
            id,
            text,
            kind,
            options,
            answer,
            explanation,
        } => {
            let question = new_question(text, kind, options, answer, explanation);
            let questions = ctx.authoring.add_question(&id, question).await?;
            writeln!(out, "Assessment now has {} questions", questions.len())?;
        }
        Command::EditQuestion {
            id,
            index,
            text,
            options,
            answer,
            explanation,
        } => {
            let patch = question_patch(text, options, answer, explanation);
            let questions = ctx.authoring.edit_question(&id, index, patch).await?;
            if let Some(q) = questions.get(index) {
                writeln!(out, "[{}] {} (answer: {})", index, q.question_text, q.correct_answer)?;
            }
        }
        Command::DeleteQuestion { id, index } => {
            let questions = ctx.authoring.remove_question(&id, index).await?;
            writeln!(out, "Assessment now has {} questions", questions.len())?;
        }
        Command::Subjects => {
            for subject in SUBJECTS {
                writeln!(out, "{}\t{}", subject.code, subject.name)?;
            }
        }
    }
    Ok(())
}

fn display_opt(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
