//! Interactive menu for the diet tracker.
//!
//! Usage:
//! ```bash
//! # Use ./ as the data directory
//! diet-tracker
//!
//! # Keep data somewhere else, with debug logs on stderr
//! diet-tracker --data-dir ~/.diet --verbose
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use diet_tracker::exercise::{walking_plan, Intensity};
use diet_tracker::prompt::Prompter;
use diet_tracker::storage::Storage;
use diet_tracker::units::{inches_to_cm, pounds_to_kg};
use diet_tracker::{
    config::Config, ActivityLevel, DietClient, DietError, Gender, MenuItem, Nutrients,
};

#[derive(Parser)]
#[command(
    name = "diet-tracker",
    about = "Track biometrics, daily calorie targets and meals"
)]
struct Cli {
    /// Directory holding biometric, meal and catalog files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

const MENU: &str = "
1. Update Biometric Data
2. View Biometric Data
3. View Historic Data
4. Delete a Specific Record
5. Delete All Records
6. Log Meal
7. View Remaining Macros and Calories for Today
8. Delete a Specific Meal
9. Delete All Meals
10. Add Meals to Meal Database
11. Exit
12. Walking Plan";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.data_dir);
    debug!(data_dir = %config.data_dir().display(), "starting");

    let client = DietClient::open(config);
    let stdin = std::io::stdin();
    let prompt = Prompter::new(stdin.lock(), std::io::stdout());

    Shell { client, prompt }
        .run()
        .await
        .context("interactive session failed")
}

struct Shell<S, R, W> {
    client: DietClient<S>,
    prompt: Prompter<R, W>,
}

impl<S: Storage, R: BufRead, W: Write> Shell<S, R, W> {
    async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.prompt.say(MENU)?;
            let choice = match self.prompt.line("Select an option: ") {
                Ok(choice) => choice,
                // stdin closed
                Err(DietError::InvalidInput(_)) => return Ok(()),
                Err(e) => return Err(e.into()),
            };

            let outcome = match choice.as_str() {
                "1" => self.update_biometrics().await,
                "2" => self.view_biometrics().await,
                "3" => self.view_historic().await,
                "4" => self.delete_historic().await,
                "5" => self.delete_all_historic().await,
                "6" => self.log_meal().await,
                "7" => self.view_remaining().await,
                "8" => self.delete_meal().await,
                "9" => self.delete_all_meals().await,
                "10" => self.add_to_catalog().await,
                "11" => {
                    self.prompt.say("Exiting...")?;
                    return Ok(());
                }
                "12" => self.walking_plan(),
                _ => self.prompt.say("Invalid option. Please try again."),
            };

            if let Err(e) = outcome {
                self.report(e)?;
            }
        }
    }

    fn report(&mut self, err: DietError) -> anyhow::Result<()> {
        match err {
            DietError::NotFound { .. } | DietError::InvalidInput(_) | DietError::NoData(_) => {
                self.prompt.say(err)?
            }
            other => {
                error!(error = %other, "operation failed");
                self.prompt.say(format!("Error: {}", other))?
            }
        }
        Ok(())
    }

    async fn update_biometrics(&mut self) -> diet_tracker::Result<()> {
        if self.client.biometrics.current().await?.is_some() {
            self.prompt.say(
                "You are about to create a new biometric record. This will save your current data as historical.",
            )?;
            if !self.prompt.confirm("Are you sure you want to proceed? (yes/no): ")? {
                return self.prompt.say("Update cancelled.");
            }
        }

        let height_in: f64 = self.prompt.number("Height (in inches): ")?;
        let weight_lb: f64 = self.prompt.number("Weight (in pounds): ")?;
        let gender = Gender::from(self.prompt.line("Gender (m/f): ")?.as_str());
        let activity =
            ActivityLevel::from(self.prompt.line("Activity level (low, moderate, high): ")?.as_str());
        let age: u32 = self.prompt.number("Age: ")?;

        let record = self.client.biometrics.new_record(
            inches_to_cm(height_in),
            pounds_to_kg(weight_lb),
            gender,
            activity,
            age,
        );
        self.client.biometrics.record_new(record).await?;
        self.prompt.say("Biometric data updated successfully.")
    }

    async fn view_biometrics(&mut self) -> diet_tracker::Result<()> {
        let current = self.client.biometrics.require_current().await?;
        let targets = diet_tracker::compute_daily_targets(&current);

        self.prompt.say("\nCurrent Biometric Data:")?;
        self.print_record(&current)?;
        self.prompt.say(format!(
            "Daily target: {:.0} calories, {}g carbs, {}g protein, {}g fat",
            targets.calories, targets.carbs_g, targets.protein_g, targets.fat_g
        ))
    }

    fn print_record(&mut self, record: &diet_tracker::BiometricRecord) -> diet_tracker::Result<()> {
        self.prompt.say(format!("Timestamp: {}", record.timestamp))?;
        self.prompt.say(format!("Height: {:.2} cm", record.height_cm))?;
        self.prompt.say(format!("Weight: {:.2} kg", record.weight_kg))?;
        self.prompt.say(format!("Gender: {}", record.gender))?;
        self.prompt.say(format!("Activity level: {}", record.activity_level))?;
        self.prompt.say(format!("Age: {}", record.age))
    }

    /// Numbered list of historic timestamps; `NoData` when empty.
    async fn list_historic(&mut self) -> diet_tracker::Result<usize> {
        let historic = self.client.biometrics.list_historic().await?;
        if historic.is_empty() {
            return Err(DietError::NoData("no historic biometric data available".to_string()));
        }
        for (i, record) in historic.iter().enumerate() {
            self.prompt.say(format!("{}. Timestamp: {}", i + 1, record.timestamp))?;
        }
        Ok(historic.len())
    }

    async fn view_historic(&mut self) -> diet_tracker::Result<()> {
        self.prompt.say("\nSelect a historic entry to view by its number:")?;
        let count = self.list_historic().await?;
        let index = self.prompt.choice("Entry number: ", count)?;
        let record = self.client.biometrics.historic(index).await?;
        self.prompt.say(format!("\nViewing Entry {}:", index))?;
        self.print_record(&record)
    }

    async fn delete_historic(&mut self) -> diet_tracker::Result<()> {
        self.list_historic().await?;
        let index: usize = self
            .prompt
            .number("Enter the number of the record you wish to delete: ")?;
        self.client.biometrics.delete_historic(index).await?;
        self.prompt.say("Record deleted successfully.")
    }

    async fn delete_all_historic(&mut self) -> diet_tracker::Result<()> {
        if !self
            .prompt
            .confirm("Are you sure you want to delete all records? (yes/no): ")?
        {
            return self.prompt.say("Operation canceled.");
        }
        self.client.biometrics.delete_all_historic().await?;
        self.prompt.say("All records have been deleted.")
    }

    async fn log_meal(&mut self) -> diet_tracker::Result<()> {
        self.prompt.say("\n1. Select a meal from a restaurant")?;
        self.prompt.say("2. Enter a meal manually")?;
        self.prompt.say("3. Back")?;
        match self.prompt.line("Choose an option: ")?.as_str() {
            "1" => self.log_from_catalog().await,
            "2" => self.log_manual_meal().await,
            "3" => Ok(()),
            _ => self.prompt.say("Invalid option."),
        }
    }

    async fn log_from_catalog(&mut self) -> diet_tracker::Result<()> {
        let restaurants = self.client.catalog.list_restaurants().await?;
        if restaurants.is_empty() {
            self.prompt.say("No restaurants available. Enter the meal manually.")?;
            return self.log_manual_meal().await;
        }

        self.prompt.say("\nAvailable Restaurants:")?;
        for (i, name) in restaurants.iter().enumerate() {
            self.prompt.say(format!("{}. {}", i + 1, name))?;
        }
        let restaurant = &restaurants[self.prompt.choice("Select a restaurant: ", restaurants.len())? - 1];

        let menu = self.client.catalog.list_menu(restaurant).await?;
        for (i, item) in menu.iter().enumerate() {
            self.prompt.say(format!(
                "{}. {} - {} calories per unit",
                i + 1,
                item.name,
                item.per_unit.calories
            ))?;
        }
        let index = self.prompt.choice("Select a meal: ", menu.len())?;
        let item = self.client.catalog.find_item(restaurant, index).await?;

        let quantity = self.prompt.quantity(&format!(
            "How many units of {} did you consume? [default: 1] ",
            item.name
        ))?;
        self.log_item(&item, quantity).await
    }

    async fn log_manual_meal(&mut self) -> diet_tracker::Result<()> {
        let name = self.prompt.line("Meal name: ")?.to_lowercase();
        let per_unit = self.read_nutrients()?;
        let quantity = self.prompt.quantity("Units consumed [default: 1]: ")?;
        let item = MenuItem { name, per_unit };
        self.log_item(&item, quantity).await?;

        if self
            .prompt
            .confirm("Save this meal to the restaurant database? (y/n): ")?
        {
            let restaurant = self.prompt.line("Restaurant name: ")?;
            self.client
                .catalog
                .add_menu_item(&restaurant, &item.name, item.per_unit)
                .await?;
            self.prompt.say(format!("Meal '{}' saved.", item.name))?;
        }
        Ok(())
    }

    async fn log_item(&mut self, item: &MenuItem, quantity: u32) -> diet_tracker::Result<()> {
        let today = self.client.today();
        self.client.ledger.log_menu_item(today, item, quantity).await?;
        self.prompt.say(format!(
            "{} unit(s) of '{}' logged successfully.",
            quantity, item.name
        ))
    }

    fn read_nutrients(&mut self) -> diet_tracker::Result<Nutrients> {
        Ok(Nutrients {
            calories: self.prompt.number("Calories per unit: ")?,
            carbs_g: self.prompt.number("Carbs (in grams) per unit: ")?,
            protein_g: self.prompt.number("Protein (in grams) per unit: ")?,
            fat_g: self.prompt.number("Fat (in grams) per unit: ")?,
        })
    }

    async fn view_remaining(&mut self) -> diet_tracker::Result<()> {
        let summary = self.client.ledger.summary_for_day(self.client.today()).await?;
        let left = summary.remaining;
        self.prompt.say(format!("Remaining for {}:", summary.date))?;
        self.prompt.say(format!("Calories: {:.1}", left.calories))?;
        self.prompt.say(format!("Carbs: {}g", left.carbs_g))?;
        self.prompt.say(format!("Protein: {}g", left.protein_g))?;
        self.prompt.say(format!("Fat: {}g", left.fat_g))
    }

    async fn delete_meal(&mut self) -> diet_tracker::Result<()> {
        let today = self.client.today();
        let meals = self.client.ledger.list_meals(today).await?;
        if meals.is_empty() {
            return Err(DietError::NoData("no meals logged today".to_string()));
        }
        for (i, meal) in meals.iter().enumerate() {
            self.prompt
                .say(format!("{}. {} x{}", i + 1, meal.name, meal.quantity))?;
        }
        let index: usize = self.prompt.number("Select a meal to delete (enter number): ")?;
        self.client.ledger.delete_meal(today, index).await?;
        self.prompt.say("Meal deleted successfully.")
    }

    async fn delete_all_meals(&mut self) -> diet_tracker::Result<()> {
        if !self
            .prompt
            .confirm("Are you sure you want to delete all meals for today? (y/n): ")?
        {
            return self.prompt.say("Deletion cancelled.");
        }
        self.client.ledger.delete_all_meals(self.client.today()).await?;
        self.prompt.say("All meals deleted.")
    }

    async fn add_to_catalog(&mut self) -> diet_tracker::Result<()> {
        let restaurant = self.prompt.line("Restaurant name: ")?;
        let known = self.client.catalog.list_restaurants().await?;
        let key = diet_tracker::catalog::normalize_name(&restaurant);
        if !known.contains(&key)
            && !self.prompt.confirm(&format!(
                "Restaurant '{}' does not exist. Add new? (y/n): ",
                key
            ))?
        {
            return self.prompt.say("Operation cancelled.");
        }

        let name = self.prompt.line("Meal name: ")?;
        let per_unit = self.read_nutrients()?;
        let item = self
            .client
            .catalog
            .add_menu_item(&restaurant, &name, per_unit)
            .await?;
        self.prompt
            .say(format!("Meal '{}' added to '{}'.", item.name, key))
    }

    fn walking_plan(&mut self) -> diet_tracker::Result<()> {
        let intensity: Intensity = self
            .prompt
            .line("Intensity (low, medium, high): ")?
            .parse()?;
        let minutes: u32 = self.prompt.number("Minutes available: ")?;
        self.prompt.say(walking_plan(intensity, minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use diet_tracker::clock::FixedClock;
    use diet_tracker::storage::MemoryStorage;

    async fn session(input: &str) -> String {
        let now = NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let client = DietClient::new(Arc::new(MemoryStorage::new()), Arc::new(FixedClock(now)));
        let prompt = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut shell = Shell { client, prompt };
        shell.run().await.unwrap();
        String::from_utf8(shell.prompt.writer().clone()).unwrap()
    }

    #[tokio::test]
    async fn option_eleven_exits() {
        let out = session("11\n2\n").await;
        assert!(out.contains("Exiting..."));
        assert!(!out.contains("no biometric data available"));
    }

    #[tokio::test]
    async fn walking_plan_follows_exit() {
        let out = session("12\nlow\n60\n11\n").await;
        assert!(out.contains("Walking at low intensity for 60 minutes, aiming to cover 2.00 miles."));
        assert!(out.ends_with("Exiting...\n"));
    }
}
