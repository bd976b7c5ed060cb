//! Spatial reference systems addressed by EPSG code.
//!
//! The registry knows the PROJ.4 definition of each supported code together with the EPSG
//! code of its geographic coordinate system (the datum the CRS is built on). Codes that are
//! not in the registry are rejected.
//!
//! # Examples
//!
//! ```
//! use expiries_geometry::SpatialRef;
//!
//! let utm = SpatialRef::from_epsg(25832).unwrap();
//! assert_eq!(utm.geog_epsg(), 4258);
//! assert!(!utm.same_geog_cs(&SpatialRef::web_mercator()));
//! ```

use anyhow::{Result, bail};
use std::fmt;

const WGS84: u32 = 4326;
const ETRS89: u32 = 4258;
const NAD83: u32 = 4269;
const RGF93: u32 = 4171;
const OSGB36: u32 = 4277;
const DHDN: u32 = 4314;

const ETRS89_DATUM: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0";
const DHDN_DATUM: &str = "+ellps=bessel +towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7";

const WGS84_ESRI_WKT: &str = concat!(
	r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],"#,
	r#"PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#
);
const WEB_MERCATOR_ESRI_WKT: &str = concat!(
	r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere","#,
	r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],"#,
	r#"PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],"#,
	r#"PROJECTION["Mercator_Auxiliary_Sphere"],PARAMETER["False_Easting",0.0],"#,
	r#"PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",0.0],"#,
	r#"PARAMETER["Standard_Parallel_1",0.0],PARAMETER["Auxiliary_Sphere_Type",0.0],"#,
	r#"UNIT["Meter",1.0]]"#
);

/// A coordinate reference system known by its EPSG code.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialRef {
	epsg: u32,
	geog_epsg: u32,
	proj4: String,
	geographic: bool,
	esri_wkt: Option<&'static str>,
}

impl SpatialRef {
	/// EPSG code of the spherical Web Mercator projection tiles are defined in.
	pub const WEB_MERCATOR: u32 = 3857;

	/// Look up `code` in the registry.
	///
	/// # Errors
	/// Returns an error if the code is not supported.
	pub fn from_epsg(code: u32) -> Result<SpatialRef> {
		let srs = match code {
			3857 | 900_913 => SpatialRef::web_mercator(),
			4326 => SpatialRef::geographic(WGS84, "+proj=longlat +datum=WGS84 +no_defs").with_wkt(WGS84_ESRI_WKT),
			4258 => SpatialRef::geographic(ETRS89, &format!("+proj=longlat {ETRS89_DATUM} +no_defs")),
			4269 => SpatialRef::geographic(NAD83, "+proj=longlat +datum=NAD83 +no_defs"),
			4171 => SpatialRef::geographic(RGF93, &format!("+proj=longlat {ETRS89_DATUM} +no_defs")),
			3035 => SpatialRef::projected(
				code,
				ETRS89,
				format!("+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 {ETRS89_DATUM} +units=m +no_defs"),
			),
			2154 => SpatialRef::projected(
				code,
				RGF93,
				format!(
					"+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 +y_0=6600000 {ETRS89_DATUM} +units=m +no_defs"
				),
			),
			27700 => SpatialRef::projected(
				code,
				OSGB36,
				"+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy \
				 +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +units=m +no_defs"
					.to_owned(),
			),
			31466..=31469 => {
				let zone = code - 31464;
				SpatialRef::projected(
					code,
					DHDN,
					format!(
						"+proj=tmerc +lat_0=0 +lon_0={} +k=1 +x_0={} +y_0=0 {DHDN_DATUM} +units=m +no_defs",
						zone * 3,
						zone * 1_000_000 + 500_000
					),
				)
			}
			32601..=32660 => SpatialRef::projected(
				code,
				WGS84,
				format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", code - 32600),
			),
			32701..=32760 => SpatialRef::projected(
				code,
				WGS84,
				format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs", code - 32700),
			),
			25828..=25838 => SpatialRef::projected(
				code,
				ETRS89,
				format!("+proj=utm +zone={} {ETRS89_DATUM} +units=m +no_defs", code - 25800),
			),
			_ => bail!("unsupported EPSG code {code}"),
		};
		Ok(srs)
	}

	/// The spherical Web Mercator projection (EPSG:3857).
	#[must_use]
	pub fn web_mercator() -> SpatialRef {
		SpatialRef::projected(
			Self::WEB_MERCATOR,
			WGS84,
			"+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs".to_owned(),
		)
		.with_wkt(WEB_MERCATOR_ESRI_WKT)
	}

	fn projected(epsg: u32, geog_epsg: u32, proj4: String) -> SpatialRef {
		SpatialRef {
			epsg,
			geog_epsg,
			proj4,
			geographic: false,
			esri_wkt: None,
		}
	}

	fn geographic(epsg: u32, proj4: &str) -> SpatialRef {
		SpatialRef {
			epsg,
			geog_epsg: epsg,
			proj4: proj4.to_owned(),
			geographic: true,
			esri_wkt: None,
		}
	}

	fn with_wkt(mut self, wkt: &'static str) -> SpatialRef {
		self.esri_wkt = Some(wkt);
		self
	}

	#[must_use]
	pub fn epsg(&self) -> u32 {
		self.epsg
	}

	/// EPSG code of the geographic coordinate system underlying this CRS.
	#[must_use]
	pub fn geog_epsg(&self) -> u32 {
		self.geog_epsg
	}

	#[must_use]
	pub fn proj4(&self) -> &str {
		&self.proj4
	}

	/// Whether coordinates are longitude/latitude in degrees.
	#[must_use]
	pub fn is_geographic(&self) -> bool {
		self.geographic
	}

	/// ESRI flavoured WKT, as expected in `.prj` files, if known.
	#[must_use]
	pub fn esri_wkt(&self) -> Option<&'static str> {
		self.esri_wkt
	}

	/// OGC URN of the CRS, e.g. `urn:ogc:def:crs:EPSG::3857`.
	#[must_use]
	pub fn urn(&self) -> String {
		format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
	}

	/// Whether both systems are built on the same geographic coordinate system.
	///
	/// This compares datums only: two different projections on the same datum are equal here.
	#[must_use]
	pub fn same_geog_cs(&self, other: &SpatialRef) -> bool {
		self.geog_epsg == other.geog_epsg
	}
}

impl Default for SpatialRef {
	fn default() -> Self {
		SpatialRef::web_mercator()
	}
}

impl fmt::Display for SpatialRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EPSG:{}", self.epsg)
	}
}
