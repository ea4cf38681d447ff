// Controller lookups on the account API

use tracing::debug;
use url::Url;

use crate::account::client::AccountClient;
use crate::account::models::{AccountController, AccountListing, ControllerDetails, ControllerInfo};
use crate::error::Error;

impl AccountClient {
    /// List the controllers registered to the account.
    ///
    /// `GET /account/v3/rest/accounts`
    pub async fn list_controllers(&self) -> Result<Vec<AccountController>, Error> {
        let url = self.endpoints().accounts.clone();
        debug!("listing account controllers");
        let listing: AccountListing = self.get(url).await?;
        Ok(listing.account.into_vec())
    }

    /// Fetch the account record of one controller.
    ///
    /// `href` comes from [`AccountController::href`].
    pub async fn controller_info(&self, href: &str) -> Result<ControllerInfo, Error> {
        let url = Url::parse(href)?;
        debug!(href, "fetching controller info");
        self.get(url).await
    }

    /// Fetch the OS version string of one controller.
    ///
    /// `GET {href}/controller`
    pub async fn controller_os_version(&self, href: &str) -> Result<String, Error> {
        let url = Url::parse(&format!("{}/controller", href.trim_end_matches('/')))?;
        debug!(href, "fetching controller OS version");
        let details: ControllerDetails = self.get(url).await?;
        Ok(details.os_version)
    }
}
