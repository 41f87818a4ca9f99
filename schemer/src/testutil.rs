//! Shared fixtures for unit tests.

use std::path::Path;

use crate::{
    ctx::{AppContext, PathConfig, RunConfig},
    overrides::OverrideRegistry,
};

pub const PROFILE_XSD: &str = r###"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://www.microsoft.com/networking/WLAN/profile/v1"
           elementFormDefault="qualified">
  <xs:element name="Profile">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="name" type="xs:string"/>
        <xs:element name="MSM" minOccurs="0">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="security" minOccurs="0">
                <xs:complexType>
                  <xs:sequence>
                    <xs:element name="OneXEnforced" type="xs:boolean" minOccurs="0"/>
                    <xs:element name="OneXEnabled" type="xs:boolean" minOccurs="0"/>
                    <xs:any processContents="lax" minOccurs="0" maxOccurs="unbounded" namespace="##other"/>
                  </xs:sequence>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"###;

pub const SECURITY_TOPIC: &str = "---
title: security (MSM) element
description: Contains the security settings of a wireless network.
ms.assetid: 5f1d9b8e-3c2a-4e7f-9d6b-0a1b2c3d4e5f
ms.topic: reference
ms.date: 05/31/2018
---

# security (MSM) element

Contains the security settings of a wireless network.

```XSD
<xs:element name=\"security\">
```

## Parent elements

* [MSM](wlan-profileschema-msm-profile-element.md)

## Child elements

| Element | Type | Description |
|-|-|-|
| [**OneXEnforced**](#onexenforced) | boolean | Indicates whether 802.1X is enforced. |
| [**OneXEnabled**](#onexenabled) | boolean | Indicates whether 802.1X is enabled. |

### OneXEnabled

Set to **true** to turn on 802.1X authentication.

## Remarks

Security settings apply to the whole profile.

## Requirements

| Requirement | Value |
|-|-|
| Minimum supported client | Windows Vista [desktop apps only] |
";

pub fn context(root: &Path) -> AppContext {
    AppContext {
        paths: PathConfig::new(root, "nativewifi"),
        run: RunConfig {
            schema_display_name: "WLAN_profile".to_string(),
            file_prefix: "wlan-profileschema".to_string(),
            xsd: root.join("profile.xsd"),
            overrides: root.join("WLAN_profile-configuration.txt"),
            date: "01/02/2025".to_string(),
        },
        overrides: OverrideRegistry::default(),
    }
}
