//! Command dispatch: each subcommand loads the menu, runs one editor
//! operation and saves the result when something changed.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{MenuEditor, NoticeLevel};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{validate_stored, DragChange, DropTarget, ItemId, LinkTarget, MenuField};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeDisplay;

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    debug!("project_dir: {}", project_dir.display());

    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `navmenu --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(command, &project_dir),
        _ => {
            let settings = Settings::load(Some(project_dir.as_path()))?;
            let container = ServiceContainer::new(settings);
            let path = container.menu_path(&project_dir, cli.file.as_deref());
            let session = Session {
                container: &container,
                path,
            };
            session.run(command)
        }
    }
}

fn resolve_project_dir(explicit: Option<&Path>) -> CliResult<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e))),
    }
}

/// One command run against one menu file.
struct Session<'a> {
    container: &'a ServiceContainer,
    path: PathBuf,
}

impl Session<'_> {
    fn run(&self, command: &Commands) -> CliResult<()> {
        match command {
            Commands::Show { collapse } => self.cmd_show(collapse),
            Commands::Add {
                parent,
                label,
                link,
                new_window,
            } => self.cmd_add(
                parent.as_deref(),
                label.as_deref(),
                link.as_deref(),
                *new_window,
            ),
            Commands::Set { id, field, value } => self.cmd_set(id, field, value),
            Commands::Rm { id } => self.cmd_rm(id),
            Commands::Move { id, over, inside } => self.cmd_move(id, over, *inside),
            Commands::Check => self.cmd_check(),
            Commands::Export { nested } => self.cmd_export(*nested),
            Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
        }
    }

    fn open(&self) -> CliResult<MenuEditor> {
        let tree = self.container.menu.load(&self.path)?;
        let mut editor = MenuEditor::new(tree, self.container.editor_options())?;
        print_notices(&mut editor);
        Ok(editor)
    }

    /// Persist the editor's snapshot; returns temporary → permanent id pairs.
    fn save(&self, editor: &mut MenuEditor) -> CliResult<Vec<(ItemId, ItemId)>> {
        let report = self.container.menu.save(&self.path, editor.tree())?;
        editor.reload(report.tree);
        Ok(report.assigned)
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_show(&self, collapse: &[String]) -> CliResult<()> {
        let mut editor = self.open()?;
        for id in collapse {
            editor.view_mut().collapse(ItemId::from(id.as_str()));
        }
        output::info(&editor.tree().to_tree_string(editor.view()));
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_add(
        &self,
        parent: Option<&str>,
        label: Option<&str>,
        link: Option<&str>,
        new_window: bool,
    ) -> CliResult<()> {
        let mut editor = self.open()?;
        let parent = parent.map(ItemId::from);
        let id = editor.create(parent.as_ref())?;

        if let Some(label) = label {
            editor.update(&id, MenuField::Label(label.to_string()))?;
        }
        if let Some(link) = link {
            editor.update(&id, MenuField::Link(link.to_string()))?;
        }
        if new_window {
            editor.update(&id, MenuField::LinkTarget(LinkTarget::NewWindow))?;
        }

        let assigned = self.save(&mut editor)?;
        let permanent = assigned
            .into_iter()
            .find(|(temp, _)| temp == &id)
            .map(|(_, permanent)| permanent)
            .unwrap_or(id);
        output::success(&format!("added {permanent}"));
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_set(&self, id: &str, field: &str, value: &str) -> CliResult<()> {
        let field = MenuField::parse(field, value).map_err(ApplicationError::from)?;
        let mut editor = self.open()?;
        let id = ItemId::from(id);
        editor.update(&id, field.clone())?;
        self.save(&mut editor)?;
        output::success(&format!("{id}: {} updated", field.name()));
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_rm(&self, id: &str) -> CliResult<()> {
        let mut editor = self.open()?;
        let id = ItemId::from(id);
        let before = editor.tree().len();
        editor.delete(&id)?;
        let removed = before - editor.tree().len();
        self.save(&mut editor)?;
        output::success(&format!("removed {id} ({removed} entries)"));
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_move(&self, id: &str, over: &str, inside: bool) -> CliResult<()> {
        let mut editor = self.open()?;
        let target = if inside {
            DropTarget::inside(over)
        } else {
            DropTarget::beside(over)
        };

        editor.begin_drag(ItemId::from(id));
        editor.hover_drag(Some(target));
        let change = editor.end_drag();

        match change {
            Some(change) => {
                self.save(&mut editor)?;
                output::success(&describe_change(&change));
                Ok(())
            }
            None => {
                let notices = editor.take_notices();
                if notices.is_empty() {
                    output::info("nothing moved");
                    return Ok(());
                }
                let message = notices
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(CliError::Rejected(message))
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_check(&self) -> CliResult<()> {
        let records = self.container.menu.load_records(&self.path)?;
        let violations = validate_stored(&records, self.container.settings.max_depth);
        if violations.is_empty() {
            output::success(&format!("{}: ok", self.path.display()));
            return Ok(());
        }
        output::header(&self.path.display());
        for violation in &violations {
            output::failure(violation);
        }
        Err(CliError::Invalid(violations.len()))
    }

    #[instrument(level = "debug", skip(self))]
    fn cmd_export(&self, nested: bool) -> CliResult<()> {
        let editor = self.open()?;
        let json = self.container.menu.export(editor.tree(), nested)?;
        output::info(&json);
        Ok(())
    }
}

fn print_notices(editor: &mut MenuEditor) {
    for notice in editor.take_notices() {
        match notice.level {
            NoticeLevel::Warning => output::warning(&notice),
            NoticeLevel::Info => output::detail(&notice),
        }
    }
}

fn describe_change(change: &DragChange) -> String {
    match change {
        DragChange::Reordered { id, from, to } => format!("moved {id} from position {from} to {to}"),
        DragChange::Reparented {
            id,
            parent: Some(parent),
            position,
        } => format!("moved {id} under {parent} at position {position}"),
        DragChange::Reparented {
            id,
            parent: None,
            position,
        } => format!("moved {id} to root level at position {position}"),
    }
}

fn cmd_config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail(&"global: (no config directory)"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(project_dir).display()
            ));
        }
    }
    Ok(())
}
