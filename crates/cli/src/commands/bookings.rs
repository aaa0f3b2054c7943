//! Strategy call bookings.

use std::path::PathBuf;

use bread_client::AppContext;
use bread_client::export;
use bread_core::{BookingId, BookingStatus, BookingUpdate, Email, NewBooking, StrategyCallBooking};
use chrono::NaiveDate;
use clap::Subcommand;

use super::{CommandError, emit, or_dash};

#[derive(Subcommand)]
pub enum BookingAction {
    /// List every booking (admin)
    List,
    /// List the signed-in user's bookings
    Mine,
    /// Request a strategy call
    Create {
        /// Contact name
        #[arg(long)]
        name: String,
        /// Contact email
        #[arg(long)]
        contact_email: Email,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Time slot, e.g. "10:00 AM"
        #[arg(long)]
        slot: String,
        #[arg(long, default_value = "UTC")]
        timezone: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change a booking's status
    Status { id: BookingId, status: BookingStatus },
    /// Delete a booking
    Delete { id: BookingId },
    /// Export every booking as CSV
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(ctx: &AppContext, action: BookingAction) -> Result<(), CommandError> {
    let bookings = ctx.bookings();

    match action {
        BookingAction::List => print_bookings(&bookings.list().await),
        BookingAction::Mine => {
            let user = ctx.auth().current_user().ok_or(CommandError::NotSignedIn)?;
            print_bookings(&bookings.list_for_user(user.id).await);
        }
        BookingAction::Create {
            name,
            contact_email,
            phone,
            company,
            date,
            slot,
            timezone,
            notes,
        } => {
            let booking = bookings
                .create(&NewBooking {
                    user_id: ctx.auth().current_user().map(|u| u.id),
                    name,
                    email: contact_email,
                    phone,
                    company,
                    preferred_date: date,
                    time_slot: slot,
                    timezone,
                    notes,
                })
                .await?;
            println!(
                "Booked {} at {} ({}), id {}",
                booking.preferred_date, booking.time_slot, booking.timezone, booking.id
            );
        }
        BookingAction::Status { id, status } => {
            let booking = bookings.update(id, &BookingUpdate::status(status)).await?;
            println!("Booking {} is now {}", booking.id, booking.status);
        }
        BookingAction::Delete { id } => {
            bookings.delete(id).await?;
            println!("Deleted booking {id}");
        }
        BookingAction::Export { output } => {
            emit(&export::bookings_csv(&bookings.list().await), output.as_deref())?;
        }
    }
    Ok(())
}

fn print_bookings(bookings: &[StrategyCallBooking]) {
    for booking in bookings {
        println!(
            "{}  {} {:<10} {:<10} {:<24} {:<20} {}",
            booking.id,
            booking.preferred_date,
            booking.time_slot,
            booking.status,
            booking.name,
            or_dash(booking.company.as_deref()),
            booking.email,
        );
    }
    println!("{} booking(s)", bookings.len());
}
