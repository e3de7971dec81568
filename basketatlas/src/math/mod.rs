pub mod normalsource;
