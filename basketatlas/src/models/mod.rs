pub mod basketsimulator;
