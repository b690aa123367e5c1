mod holidays;
mod recurrence;
