/*!
# Healthcare Data Dashboard

A browser-based dashboard for exploring tabular health data, built in Rust.

## Overview

The application serves an authenticated dashboard over a CSV dataset. On
first run it synthesizes a small sample dataset and persists it; users can
then browse standard charts of the data, upload their own CSV to replace
the working table, request ad-hoc visualizations through a small chart
request language, and download a multi-page PDF report.

## Architecture

The application follows a client-server architecture:

### Frontend Layer
- **Technologies**: HTML, CSS
- **Key Components**:
  - Login/signup pages
  - Dashboard with embedded chart images
  - Profile and password management pages

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Credential Store - JSON-backed user records with salted Argon2 hashes
  - Dataset Provider - CSV parsing, column typing, sample synthesis
  - Chart Renderers - scatter, bar, line, histogram, boxplot, heatmap
  - Report Generator - paginated PDF assembly from rendered figures
  - Chart Request Interpreter - allow-listed, arity-checked chart requests
  - Session Registry - cookie-backed sessions with expiry

## Modules

- **dataset**: Table/column model, CSV parsing, sample dataset
- **columns**: Column selection policy for the default charts
- **store**: User records, password hashing and verification
- **chart**: Figure rendering into in-memory RGB buffers
- **report**: PDF report composition
- **chartspec**: Restricted chart request parsing and evaluation
- **session**: Session creation, validation, and teardown
- **app**: Routing and request handlers

## REST API Endpoints

- `/login`, `/signup`, `/logout`, `/change-password` - Authentication
- `/dashboard`, `/profile` - Pages
- `/chart/{kind}` - Rendered chart PNG for the current table
- `/upload` - Replace the working table with an uploaded CSV
- `/report` - Download the PDF report
- `/visualize`, `/viz/{id}` - Ad-hoc chart requests and their results
*/

pub mod chart;
pub mod chartspec;
pub mod columns;
pub mod dataset;
pub mod report;
pub mod session;
pub mod store;

#[cfg(feature = "web")]
pub mod app;

pub use chart::{ChartError, ChartKind, Figure};
pub use dataset::{load_dataset, Table, Value};
pub use report::generate_report;
pub use store::CredentialStore;
