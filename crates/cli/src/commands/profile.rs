//! Profile commands.

use clap::Args;
use studentbnb_client::UpdateProfileRequest;

use super::Context;
use crate::output;

/// Fields accepted by `sbnb profile update`.
#[derive(Debug, Default, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub university: Option<String>,
    #[arg(long)]
    pub graduation_year: Option<i32>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub zipcode: Option<String>,
}

impl ProfileArgs {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.bio.is_none()
            && self.university.is_none()
            && self.graduation_year.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.zipcode.is_none()
    }
}

impl From<ProfileArgs> for UpdateProfileRequest {
    fn from(args: ProfileArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            phone_number: args.phone,
            bio: args.bio,
            university: args.university,
            graduation_year: args.graduation_year,
            city: args.city,
            state: args.state,
            country: args.country,
            zipcode: args.zipcode,
        }
    }
}

/// # Errors
///
/// Returns an error if the profile cannot be fetched.
pub async fn show(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let profile = ctx.clients.views().fetch_profile().await?;
    output::profile(&profile);
    Ok(())
}

/// # Errors
///
/// Returns an error if no field was given or the update is rejected.
pub async fn update(ctx: &Context, args: ProfileArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.is_empty() {
        return Err("nothing to update; pass at least one field".into());
    }
    let profile = ctx
        .clients
        .views()
        .save_profile(&UpdateProfileRequest::from(args))
        .await?;
    output::message("Profile updated.");
    output::profile(&profile);
    Ok(())
}
