//! Backend adapters over the PostgREST row API

pub mod appointment_repository;
pub mod client;
pub mod doctor_repository;

pub use appointment_repository::RestAppointmentRepository;
pub use client::PostgrestClient;
pub use doctor_repository::RestDoctorRepository;
