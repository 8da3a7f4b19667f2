use anyhow::Result;
use colored::Colorize;
use smartcare_client::{InsertUser, SmartCareClient, UserRole};

use crate::cli::{LoginArgs, OutputFormat, RegisterArgs, RoleArg};
use crate::commands::Reported;
use crate::output::{print_error, print_value};

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Director => UserRole::Director,
            RoleArg::Nurse => UserRole::Nurse,
            RoleArg::Patient => UserRole::Patient,
            RoleArg::Guardian => UserRole::Guardian,
        }
    }
}

pub async fn login(client: &SmartCareClient, args: &LoginArgs) -> Result<()> {
    client
        .auth()
        .login(&args.username, &args.password)
        .await
        .map_err(|_| Reported)?;
    Ok(())
}

pub async fn register(client: &SmartCareClient, args: &RegisterArgs) -> Result<()> {
    let input = InsertUser {
        username: args.username.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        name: args.name.clone(),
        role: args.role.into(),
        preferred_language: args.language.clone(),
    };
    client.auth().register(&input).await.map_err(|_| Reported)?;
    Ok(())
}

pub async fn logout(client: &SmartCareClient) -> Result<()> {
    if client.session().identity().is_none() {
        println!("Not signed in");
        return Ok(());
    }
    client.auth().logout().await.map_err(|_| Reported)?;
    Ok(())
}

pub async fn whoami(client: &SmartCareClient, profile: &str, format: OutputFormat) -> Result<()> {
    match client.auth().current_user().await? {
        Some(user) if format == OutputFormat::Json => print_value(user.as_ref(), format)?,
        Some(user) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {} ({})", "User".cyan(), user.name, user.username);
            println!("{}: {}", "Role".cyan(), user.role);
            if let Some(email) = &user.email {
                println!("{}: {}", "Email".cyan(), email);
            }
        }
        None => print_error(&format!("Not signed in (profile: \"{profile}\")")),
    }
    Ok(())
}
