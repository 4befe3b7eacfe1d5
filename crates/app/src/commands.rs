//! Subcommand implementations.

use std::error::Error;

use openheaders_application::{
    BackgroundContext, BackgroundEvent, FilterPatch, HeaderPatch, UpdateScheduler,
};
use openheaders_domain::{
    FilterType, HeaderType, MatchType, TabInfo, is_active_for_url, matching_filters,
    parse_http_url,
};
use openheaders_infrastructure::{
    ProfileImporter, RuntimeConfig, SessionRuleTable, ToolbarState, to_json_stable, write_export,
};

use crate::cli::{Command, OperationArg};
use crate::session::Session;

type CommandResult = Result<(), Box<dyn Error>>;

pub async fn run(command: Command, config: &RuntimeConfig) -> CommandResult {
    let mut session = Session::open(config).await;
    let result = dispatch(command, &mut session).await;
    session.close().await;
    result
}

async fn dispatch(command: Command, session: &mut Session) -> CommandResult {
    match command {
        Command::Profiles => {
            list_profiles(session);
            Ok(())
        }
        Command::AddProfile { name } => {
            let id = session.store.add_profile(name.as_deref());
            println!("{id}");
            Ok(())
        }
        Command::RemoveProfile { profile } => {
            let id = require_profile(session, Some(&profile))?;
            session.store.remove_profile(&id);
            Ok(())
        }
        Command::Activate { profile } => {
            let id = require_profile(session, Some(&profile))?;
            session.store.set_active_profile(&id);
            Ok(())
        }
        Command::AddHeader {
            profile,
            name,
            value,
            operation,
            response,
        } => add_header(session, profile.as_deref(), name, value, operation, response),
        Command::AddFilter {
            profile,
            match_type,
            pattern,
            exclude,
        } => add_filter(session, profile.as_deref(), match_type, pattern, exclude),
        Command::Rules { tabs, active } => print_rules(session, tabs, active).await,
        Command::Check { url } => check(session, &url),
        Command::Export { output, profiles } => {
            let ids = profiles
                .iter()
                .map(|p| require_profile(session, Some(p)))
                .collect::<Result<Vec<_>, _>>()?;
            let selection = (!ids.is_empty()).then_some(ids.as_slice());
            let file = session.store.export_profiles(selection);
            write_export(&output, &file).await?;
            println!("Exported {} profiles to {}", file.profiles.len(), output.display());
            Ok(())
        }
        Command::Import { input } => {
            let result = ProfileImporter::new().parse_file(&input).await?;
            for warning in &result.warnings {
                eprintln!("{warning}");
            }
            let count = result.profiles.len();
            if !session.store.import_profiles(result.profiles) {
                return Err("nothing imported".into());
            }
            tracing::info!(count, path = %input.display(), "import finished");
            println!("Imported {count} profiles");
            Ok(())
        }
        Command::Theme { theme } => {
            session.store.set_dark_mode_preference(theme.into());
            Ok(())
        }
        Command::Language { language } => {
            session.store.set_language_preference(&language);
            Ok(())
        }
    }
}

fn require_profile(session: &Session, key: Option<&str>) -> Result<String, Box<dyn Error>> {
    session
        .resolve_profile_id(key)
        .ok_or_else(|| format!("no profile matches '{}'", key.unwrap_or("<active>")).into())
}

fn list_profiles(session: &Session) {
    let state = session.store.state();
    for profile in &state.profiles {
        let marker = if state.active_profile_id.as_deref() == Some(profile.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {}  {}  ({} headers, {} filters)",
            profile.id,
            profile.name,
            profile.effective_headers().count(),
            profile.url_filters.len()
        );
    }
}

fn add_header(
    session: &mut Session,
    profile: Option<&str>,
    name: String,
    value: String,
    operation: OperationArg,
    response: bool,
) -> CommandResult {
    let profile_id = require_profile(session, profile)?;
    let header_id = session
        .store
        .add_header(&profile_id)
        .ok_or("profile disappeared")?;
    let header_type = if response {
        HeaderType::Response
    } else {
        HeaderType::Request
    };
    session.store.update_header(
        &profile_id,
        &header_id,
        HeaderPatch {
            name: Some(name),
            value: Some(value),
            header_type: Some(header_type),
            operation: Some(operation.into()),
            ..HeaderPatch::default()
        },
    );
    println!("{header_id}");
    Ok(())
}

fn add_filter(
    session: &mut Session,
    profile: Option<&str>,
    match_type: String,
    pattern: String,
    exclude: bool,
) -> CommandResult {
    let profile_id = require_profile(session, profile)?;
    let filter_id = session
        .store
        .add_url_filter(&profile_id)
        .ok_or("profile disappeared")?;
    let filter_type = if exclude {
        FilterType::Exclude
    } else {
        FilterType::Include
    };
    session.store.update_url_filter(
        &profile_id,
        &filter_id,
        FilterPatch {
            match_type: Some(MatchType::from(match_type)),
            pattern: Some(pattern),
            filter_type: Some(filter_type),
            ..FilterPatch::default()
        },
    );
    println!("{filter_id}");
    Ok(())
}

async fn print_rules(session: &Session, tabs: Vec<TabInfo>, active: Option<i32>) -> CommandResult {
    let context = BackgroundContext::new(
        session.store.state().clone(),
        SessionRuleTable::new(),
        ToolbarState::new(),
    );
    let (handle, task) = UpdateScheduler::spawn(context);

    handle.send(BackgroundEvent::TabsSnapshot(tabs))?;
    if let Some(id) = active {
        handle.send(BackgroundEvent::TabActivated(id))?;
    }
    let rules = handle.get_active_rules().await?;
    drop(handle);
    let context = task.await?;

    print!("{}", to_json_stable(&rules)?);
    let appearance = context.appearance_sink().current().await;
    if appearance.active {
        eprintln!(
            "badge: {} ({})",
            appearance.badge_text,
            appearance.badge_color.unwrap_or_default()
        );
    }
    Ok(())
}

fn check(session: &Session, url: &str) -> CommandResult {
    let profile = session.store.active_profile().ok_or("no active profile")?;
    if let Err(error) = parse_http_url(url) {
        println!("{}: not eligible ({error})", profile.name);
        return Ok(());
    }
    let verdict = if is_active_for_url(profile, url) {
        "applies"
    } else {
        "does not apply"
    };
    println!("{}: {verdict}", profile.name);
    for id in matching_filters(profile, url) {
        if let Some(filter) = profile.url_filter(id) {
            println!(
                "  {} {} {} {}",
                filter.filter_type, filter.match_type, filter.pattern, filter.id
            );
        }
    }
    Ok(())
}
