use buildco_application::command::Command;
use buildco_application::envelope::CommandEnvelope;
use buildco_macros::command;

#[command(name = "RenameSite", output = u64, invalidates = ["ListSites", "GetSite"])]
pub struct RenameSite {
    pub site: u64,
    pub name: String,
}

#[command(name = "ArchiveSite")]
pub struct ArchiveSite {
    pub envelope: CommandEnvelope,
    pub site: u64,
}

fn main() {
    let cmd = RenameSite {
        envelope: CommandEnvelope::default(),
        site: 7,
        name: "North yard".to_string(),
    };

    assert_eq!(RenameSite::NAME, "RenameSite");
    assert_eq!(RenameSite::INVALIDATES, &["ListSites", "GetSite"]);
    let _: Option<<RenameSite as Command>::Output> = Some(1u64);
    let _ = format!("{:?}", cmd);
    let _ = cmd.envelope().id();

    assert!(ArchiveSite::INVALIDATES.is_empty());
    let _: <ArchiveSite as Command>::Output = ();
}
