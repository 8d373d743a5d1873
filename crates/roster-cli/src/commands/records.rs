use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use dialoguer::Confirm;

use roster_core::messaging::messages::OperationStatus;
use roster_core::storage::Record;
use roster_core::validation::{describe, validate_fields};
use roster_core::{Fields, RecordStore, RecordType};

use crate::app::{AppContext, Operation, PasswordUse};
use crate::cli::{AddArgs, DeleteArgs, ListArgs, ShowArgs, StatsArgs, UpdateArgs};
use crate::errors::CliError;
use crate::helpers::{merge_fields, parse_fields, parse_record_type, read_fields_file};
use crate::ui::{hint, kv, print, receipt, table, title, UiContext};

const LIST_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

fn format_local(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(LIST_TIME_FORMAT).to_string()
}

fn record_not_found(id: u64) -> anyhow::Error {
    CliError::not_found(
        format!("Record {} not found", id),
        "Hint: run `roster list` to see existing records.",
    )
    .into()
}

fn record_summary_json(record: &Record) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "type": record.record_type,
        "description": record.description,
        "created_at": record.created_at,
        "updated_at": record.updated_at,
    })
}

/// Run `work`, notifying the messenger of its outcome either way.
fn with_notification<T>(
    ctx: &AppContext,
    operation: &str,
    work: impl FnOnce() -> anyhow::Result<(T, String)>,
) -> anyhow::Result<T> {
    match work() {
        Ok((value, details)) => {
            ctx.notify(operation, OperationStatus::Success, &details);
            Ok(value)
        }
        Err(err) => {
            ctx.notify(operation, OperationStatus::Failure, &err.to_string());
            Err(err)
        }
    }
}

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let record_type = parse_record_type(&args.record_type)?;
    let mut fields = match args.from_file.as_deref() {
        Some(path) => read_fields_file(Path::new(path))?,
        None => Fields::new(),
    };
    merge_fields(&mut fields, parse_fields(&args.fields)?);
    validate_fields(record_type, &fields)?;

    let store = ctx.open_store()?;
    let ui = UiContext::from_env(false);
    let encryption = ctx.encryption(&ui, PasswordUse::Encrypt)?;
    ctx.confirm(
        &ui,
        Operation::Encrypt {
            record_type,
            record_id: None,
        },
    )?;

    let description = describe(&fields);
    let id = with_notification(ctx, "encryption", || {
        let ciphertext = encryption.encrypt(&fields)?;
        let id = store.add_record(&ciphertext, record_type, &description)?;
        Ok((id, format!("Record {} ({}) encrypted", id, description)))
    })?;

    if !ctx.quiet() {
        let id_text = id.to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Record encrypted and saved",
                &[
                    ("ID", id_text.as_str()),
                    ("Type", record_type.as_str()),
                    ("Description", description.as_str()),
                ],
            ),
        );
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let filter = args
        .record_type
        .as_deref()
        .map(parse_record_type)
        .transpose()?;
    let store = ctx.open_store()?;
    let records: Vec<Record> = store
        .get_all()?
        .into_iter()
        .filter(|record| filter.map_or(true, |t| record.record_type == t))
        .collect();

    let ui = UiContext::from_env(args.json);
    if ui.mode.is_json() {
        let values: Vec<_> = records.iter().map(record_summary_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if records.is_empty() {
        if !ctx.quiet() {
            print(&ui, "No records");
            print(&ui, &hint(&ui, "roster add <TYPE> --field key=value"));
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.id.to_string(),
                record.record_type.to_string(),
                record.description.clone(),
                format_local(&record.created_at),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&ui, &["ID", "TYPE", "DESCRIPTION", "CREATED"], &rows)
    );
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let record = store
        .get_by_id(args.id)?
        .ok_or_else(|| record_not_found(args.id))?;

    let ui = UiContext::from_env(args.json);
    let encryption = ctx.encryption(&ui, PasswordUse::Decrypt)?;
    ctx.confirm(
        &ui,
        Operation::Decrypt {
            record_id: Some(record.id),
        },
    )?;

    let fields = with_notification(ctx, "decryption", || {
        let fields = encryption.decrypt(&record.encrypted_data)?;
        Ok((fields, format!("Record {} decrypted", record.id)))
    })?;

    if ui.mode.is_json() {
        let mut value = record_summary_json(&record);
        value["fields"] = serde_json::to_value(&fields)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if !ctx.quiet() {
        if ui.mode.is_pretty() {
            print(
                &ui,
                &title(
                    &ui,
                    &format!("Record {} \u{00B7} {}", record.id, record.record_type),
                ),
            );
        } else {
            print(&ui, &kv(&ui, "id", &record.id.to_string()));
            print(&ui, &kv(&ui, "type", record.record_type.as_str()));
        }
        print(&ui, &kv(&ui, "Created", &format_local(&record.created_at)));
        print(&ui, &kv(&ui, "Updated", &format_local(&record.updated_at)));
        if ui.mode.is_pretty() {
            println!();
        }
    }
    for (key, value) in &fields {
        println!("{}", kv(&ui, key, value));
    }
    Ok(())
}

pub fn handle_update(ctx: &AppContext, args: &UpdateArgs) -> anyhow::Result<()> {
    let changes = parse_fields(&args.fields)?;
    let store = ctx.open_store()?;
    let record = store
        .get_by_id(args.id)?
        .ok_or_else(|| record_not_found(args.id))?;

    let ui = UiContext::from_env(false);
    let encryption = ctx.encryption(&ui, PasswordUse::Encrypt)?;
    let mut fields = encryption.decrypt(&record.encrypted_data)?;
    merge_fields(&mut fields, changes);
    validate_fields(record.record_type, &fields)?;

    ctx.confirm(
        &ui,
        Operation::Encrypt {
            record_type: record.record_type,
            record_id: Some(record.id),
        },
    )?;

    let description = describe(&fields);
    with_notification(ctx, "encryption", || {
        let ciphertext = encryption.encrypt(&fields)?;
        store.update_by_id(record.id, &ciphertext, &description)?;
        Ok(((), format!("Record {} ({}) re-encrypted", record.id, description)))
    })?;

    if !ctx.quiet() {
        let id_text = record.id.to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Record updated",
                &[
                    ("ID", id_text.as_str()),
                    ("Description", description.as_str()),
                ],
            ),
        );
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let record = store
        .get_by_id(args.id)?
        .ok_or_else(|| record_not_found(args.id))?;
    let ui = UiContext::from_env(false);

    if !args.force {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::invalid_input(
                "Refusing to delete without a terminal; pass --force to confirm",
            )
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete record {} ({})?",
                record.id, record.description
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            if !ctx.quiet() {
                print(&ui, &kv(&ui, "status", "cancelled"));
            }
            return Ok(());
        }
    }

    if !store.delete_by_id(record.id)? {
        return Err(record_not_found(record.id));
    }

    if !ctx.quiet() {
        let id_text = record.id.to_string();
        print(
            &ui,
            &receipt(&ui, "Record deleted", &[("ID", id_text.as_str())]),
        );
    }
    Ok(())
}

pub fn handle_stats(ctx: &AppContext, args: &StatsArgs) -> anyhow::Result<()> {
    let stats = ctx.open_store()?.stats()?;
    let ui = UiContext::from_env(args.json);

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = RecordType::ALL
        .iter()
        .map(|record_type| {
            vec![
                record_type.to_string(),
                stats.count(*record_type).to_string(),
            ]
        })
        .collect();
    rows.push(vec!["total".to_string(), stats.total.to_string()]);

    println!(
        "{}",
        table(&ui, &["TYPE", "COUNT"], &rows)
    );
    Ok(())
}
