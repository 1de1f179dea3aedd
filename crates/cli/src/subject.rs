//! Certificate subject fields and key-usage flag composition.

use clap::Args;
use rcgen::{DistinguishedName, DnType, KeyUsagePurpose};

use crate::error::PkiError;

/// Subject identity of a certificate. Common name is mandatory; the rest of
/// the attributes are attached only when present.
#[derive(Debug, Clone)]
pub struct Subject {
    pub common_name: String,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub locality: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
}

impl Subject {
    pub fn distinguished_name(&self) -> DistinguishedName {
        let mut dn = DistinguishedName::new();
        if let Some(country) = &self.country {
            dn.push(DnType::CountryName, country.as_str());
        }
        if let Some(province) = &self.province {
            dn.push(DnType::StateOrProvinceName, province.as_str());
        }
        if let Some(locality) = &self.locality {
            dn.push(DnType::LocalityName, locality.as_str());
        }
        if let Some(organization) = &self.organization {
            dn.push(DnType::OrganizationName, organization.as_str());
        }
        if let Some(unit) = &self.organizational_unit {
            dn.push(DnType::OrganizationalUnitName, unit.as_str());
        }
        dn.push(DnType::CommonName, self.common_name.as_str());
        dn
    }
}

/// Subject flags shared by every issuance command.
#[derive(Args, Debug, Clone)]
pub struct SubjectArgs {
    /// Common Name
    #[arg(long, value_name = "NAME")]
    pub cn: Option<String>,

    /// Organization Name
    #[arg(long, value_name = "NAME")]
    pub org: Option<String>,

    /// Organizational Unit
    #[arg(long, value_name = "NAME")]
    pub ou: Option<String>,

    /// Locality (city)
    #[arg(long, value_name = "NAME")]
    pub locality: Option<String>,

    /// Province or state
    #[arg(long, value_name = "NAME")]
    pub province: Option<String>,

    /// Country (2-letter code)
    #[arg(long, value_name = "CODE")]
    pub country: Option<String>,
}

impl SubjectArgs {
    pub fn to_subject(&self) -> Result<Subject, PkiError> {
        let common_name = match &self.cn {
            Some(cn) if !cn.trim().is_empty() => cn.clone(),
            _ => return Err(PkiError::SubjectInvalid("common name (CN) is required")),
        };
        Ok(Subject {
            common_name,
            organization: self.org.clone(),
            organizational_unit: self.ou.clone(),
            locality: self.locality.clone(),
            province: self.province.clone(),
            country: self.country.clone(),
        })
    }
}

/// Key-usage flags for leaf certificates, OR-combined into the certificate's
/// usage bit set. Each flag maps to exactly one bit; the mapping below is
/// exhaustive for the usages this tool issues.
#[derive(Args, Debug, Clone, Default)]
pub struct KeyUsageArgs {
    /// Permit digital signatures
    #[arg(long)]
    pub digital_signature: bool,

    /// Permit key encipherment
    #[arg(long)]
    pub key_encipherment: bool,

    /// Permit data encipherment
    #[arg(long)]
    pub data_encipherment: bool,

    /// Permit key agreement
    #[arg(long)]
    pub key_agreement: bool,

    /// Permit signing certificate revocation lists
    #[arg(long)]
    pub crl_sign: bool,

    /// With key agreement: encipher only
    #[arg(long)]
    pub encipher_only: bool,

    /// With key agreement: decipher only
    #[arg(long)]
    pub decipher_only: bool,
}

impl KeyUsageArgs {
    pub fn purposes(&self) -> Vec<KeyUsagePurpose> {
        let mapping: [(bool, KeyUsagePurpose); 7] = [
            (self.digital_signature, KeyUsagePurpose::DigitalSignature),
            (self.key_encipherment, KeyUsagePurpose::KeyEncipherment),
            (self.data_encipherment, KeyUsagePurpose::DataEncipherment),
            (self.key_agreement, KeyUsagePurpose::KeyAgreement),
            (self.crl_sign, KeyUsagePurpose::CrlSign),
            (self.encipher_only, KeyUsagePurpose::EncipherOnly),
            (self.decipher_only, KeyUsagePurpose::DecipherOnly),
        ];
        mapping
            .into_iter()
            .filter_map(|(enabled, purpose)| enabled.then_some(purpose))
            .collect()
    }
}
