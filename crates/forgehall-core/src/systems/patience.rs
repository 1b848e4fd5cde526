//! Customer patience expiry.

use crate::customers::Customer;
use crate::state::Millis;

/// Remove every customer whose patience has run out. Returns the departed
/// customers; they yield no reward and no experience.
pub fn expire_customers(customers: &mut Vec<Customer>, now: Millis) -> Vec<Customer> {
    let (expired, remaining): (Vec<Customer>, Vec<Customer>) =
        customers.drain(..).partition(|c| c.is_expired(now));
    *customers = remaining;
    expired
}
