pub mod boat_module;
pub mod crew_member;
pub mod trip;
