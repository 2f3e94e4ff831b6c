//! Line commands accepted by the simulator shell.

use dialup_types::settings::SettingsForm;
use dialup_types::tab::{FrameId, TabId};

pub const HELP: &str = "\
Commands:
  open <tab> <url>             top-level navigation in <tab>
  frame <tab> <frame> <url>    sub-frame navigation (never intercepted)
  tabs                         list tabs and their current URL
  pending <tab>                show the pending destination for <tab>
  status                       popup status line
  toggle                       popup on/off switch
  settings                     show stored settings
  save <min> <vol%> <domains>  options page save (domains comma-separated)
  reset                        restore default settings
  sweep                        drop orphaned pending navigations now
  help                         this text
  quit                         exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open { tab: TabId, url: String },
    Frame { tab: TabId, frame: FrameId, url: String },
    Tabs,
    Pending(TabId),
    Status,
    Toggle,
    Settings,
    Save(SettingsForm),
    Reset,
    Sweep,
    Help,
    Quit,
}

/// Parse one input line. Empty lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (name, args.as_slice()) {
        ("open", [tab, url]) => Command::Open {
            tab: parse_tab(tab)?,
            url: (*url).to_string(),
        },
        ("frame", [tab, frame, url]) => Command::Frame {
            tab: parse_tab(tab)?,
            frame: FrameId(parse_number(frame, "frame id")?),
            url: (*url).to_string(),
        },
        ("tabs", []) => Command::Tabs,
        ("pending", [tab]) => Command::Pending(parse_tab(tab)?),
        ("status", []) => Command::Status,
        ("toggle", []) => Command::Toggle,
        ("settings", []) => Command::Settings,
        ("save", [minutes, volume, domains @ ..]) => Command::Save(SettingsForm {
            allowlist_text: domains.join(" ").replace(',', "\n"),
            timeout_minutes: parse_number(minutes, "timeout")?,
            volume_percent: parse_number(volume.trim_end_matches('%'), "volume")?,
        }),
        ("reset", []) => Command::Reset,
        ("sweep", []) => Command::Sweep,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (
            "open" | "frame" | "tabs" | "pending" | "status" | "toggle" | "settings" | "save"
            | "reset" | "sweep" | "help" | "quit",
            _,
        ) => return Err(format!("{name}: wrong arguments (try 'help')")),
        _ => return Err(format!("unknown command: {name}")),
    };
    Ok(Some(cmd))
}

fn parse_tab(s: &str) -> Result<TabId, String> {
    s.parse::<TabId>()
        .map_err(|_| format!("invalid tab id: {s}"))
}

fn parse_number<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid {what}: {s}"))
}
