use clap::Parser;

use crate::{
    cli::{SettingsArgs, StoreArgs},
    prelude::*,
    store::ClientId,
};

#[derive(Parser)]
pub struct ColumnsArgs {
    #[clap(flatten)]
    pub(super) settings: SettingsArgs,

    #[clap(flatten)]
    pub(super) store: StoreArgs,

    #[clap(long = "client", env = "CFE_CLIENT")]
    client_id: ClientId,
}

impl ColumnsArgs {
    pub fn run(self) -> Result {
        let settings = self.settings.load()?;
        let calculator = self.store.calculator(&settings, settings.integration_options())?;
        for column in calculator.columns(self.client_id)? {
            println!("{column}");
        }
        Ok(())
    }
}
