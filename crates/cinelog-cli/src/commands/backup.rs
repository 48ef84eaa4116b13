use super::ui;
use super::{prompts, AppContext};
use crate::output::Output;
use crate::BackupCommands;
use cinelog_core::BackupManager;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use std::io;
use std::path::Path;

pub fn run_backup(cmd: BackupCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::local()?;
    let manager = BackupManager::from_config(&ctx.repo, &ctx.config.backup, &ctx.paths);

    match cmd {
        BackupCommands::Create => {
            let file = manager
                .create_backup()
                .map_err(|e| eyre!("Backup failed: {}", e))?;
            output.data(&file);
            output.success(format!("Backup written to {} ({} KB)", file.path.display(), file.size_kb));
            Ok(())
        }
        BackupCommands::List => {
            let files = manager.list_backups()?;
            output.data(&files);

            if output.is_human() {
                if files.is_empty() {
                    output.info(format!("No backups in {}", manager.backup_dir().display()));
                    return Ok(());
                }
                let mut table = ui::table(&["Name", "Size", "Modified"]);
                for file in &files {
                    table.add_row(vec![
                        Cell::new(&file.name),
                        Cell::new(format!("{} KB", file.size_kb)),
                        Cell::new(file.modified.format("%Y-%m-%d %H:%M:%S")),
                    ]);
                }
                println!("{}", table);
                output.info(format!("Directory: {}", manager.backup_dir().display()));
            }
            Ok(())
        }
        BackupCommands::Delete { name } => {
            manager.delete_backup(&name)?;
            output.success(format!("Deleted {}", name));
            Ok(())
        }
        BackupCommands::Export { path } => {
            if path == "-" {
                let stdout = io::stdout();
                let mut writer = stdout.lock();
                manager.export_to_writer(&mut writer)?;
                return Ok(());
            }

            let path = Path::new(&path);
            manager
                .export_to_path(path)
                .map_err(|e| eyre!("Export to {} failed: {}", path.display(), e))?;
            output.success(format!("Library exported to {}", path.display()));
            Ok(())
        }
        BackupCommands::Restore { path, yes } => {
            if !yes {
                let stats = ctx.repo.stats()?;
                let prompt = format!(
                    "Replace your library ({} watched, {} planned, {} watching) with {}?",
                    stats.watched,
                    stats.planned,
                    stats.watching,
                    path.display()
                );
                if !prompts::prompt_yes_no(&prompt, false)? {
                    output.info("Restore cancelled.");
                    return Ok(());
                }
            }

            let summary = manager
                .restore_from_path(&path)
                .map_err(|e| eyre!("Restore failed, library unchanged: {}", e))?;
            output.data(&summary);
            output.success(format!(
                "Restored {} watched, {} planned, {} watching",
                summary.watched, summary.planned, summary.watching
            ));
            Ok(())
        }
    }
}
